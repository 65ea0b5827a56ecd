use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use crate::application::CashCardService;
use crate::auth::UserStore;
use crate::domain::{
    CashCard, CashCardId, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE, PAGE_SIZE_LIMIT, PageRequest,
    Principal, Sort, format_cents, parse_cents,
};
use crate::http::{self, AppState};
use crate::io::{ExportFormat, Exporter};

/// Cashcard - ownership-scoped cash cards over HTTP
#[derive(Parser)]
#[command(name = "cashcard")]
#[command(about = "Serve and administer cash cards, each visible only to its owner")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "CASHCARD_DATABASE", default_value = "cashcard.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "CASHCARD_BIND", default_value = "127.0.0.1:8080")]
        bind: String,

        /// User allowed to sign in, as name:password[:role+role] (repeatable)
        #[arg(short, long = "user", env = "CASHCARD_USERS", value_delimiter = ',')]
        users: Vec<String>,

        /// Largest page size a client may request
        #[arg(
            long,
            env = "CASHCARD_MAX_PAGE_SIZE",
            default_value_t = DEFAULT_MAX_PAGE_SIZE,
            value_parser = clap::value_parser!(u32).range(1..=PAGE_SIZE_LIMIT as i64)
        )]
        max_page_size: u32,
    },

    /// Cash card commands, acting on behalf of an owner
    #[command(subcommand)]
    Card(CardCommands),

    /// Export an owner's cash cards to CSV or JSON
    Export {
        /// Owner whose cards are exported
        #[arg(long)]
        owner: String,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CardCommands {
    /// Create a cash card
    Create {
        /// Amount (e.g., "123.45" or "50")
        amount: String,

        /// Owner of the new card
        #[arg(long)]
        owner: String,
    },

    /// Show a cash card
    Show {
        /// Cash card ID
        id: CashCardId,

        /// Owner of the card
        #[arg(long)]
        owner: String,
    },

    /// List an owner's cash cards, one page at a time
    List {
        /// Owner whose cards are listed
        #[arg(long)]
        owner: String,

        /// Page index, starting at 0
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Page size
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: u32,

        /// Sort as field[,asc|desc] (repeatable, defaults to amount ascending)
        #[arg(long)]
        sort: Vec<String>,
    },

    /// Replace the amount of a cash card
    Update {
        /// Cash card ID
        id: CashCardId,

        /// New amount
        amount: String,

        /// Owner of the card
        #[arg(long)]
        owner: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        match self.command {
            Commands::Init => {
                CashCardService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Serve {
                bind,
                users,
                max_page_size,
            } => {
                let users = UserStore::from_entries(&users)?;
                if users.is_empty() {
                    bail!("No users configured. Pass --user name:password or set CASHCARD_USERS");
                }

                let service = CashCardService::init(&self.database)
                    .await?
                    .with_max_page_size(max_page_size);
                info!(database = %self.database, users = users.len(), "Initialized state");

                let listener = TcpListener::bind(&bind)
                    .await
                    .with_context(|| format!("Failed to bind {}", bind))?;
                http::serve(listener, AppState::new(service, users)).await?;
            }

            Commands::Card(card_cmd) => {
                let service = CashCardService::connect(&self.database).await?;
                run_card_command(&service, card_cmd).await?;
            }

            Commands::Export {
                owner,
                format,
                output,
            } => {
                let service = CashCardService::connect(&self.database).await?;
                run_export_command(&service, &owner, &format, output).await?;
            }
        }

        Ok(())
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    // Ignore the error raised when a subscriber is already installed.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn run_card_command(service: &CashCardService, cmd: CardCommands) -> Result<()> {
    match cmd {
        CardCommands::Create { amount, owner } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '123.45' or '50'")?;
            let card = service
                .create_cash_card(Some(amount_cents), &Principal::card_owner(owner))
                .await?;
            println!(
                "Created cash card {} for {}: {}",
                display_id(&card),
                card.owner,
                format_cents(card.amount)
            );
        }

        CardCommands::Show { id, owner } => {
            let card = service
                .get_cash_card(id, &Principal::card_owner(owner))
                .await?;
            println!("ID:     {}", display_id(&card));
            println!("Owner:  {}", card.owner);
            println!("Amount: {}", format_cents(card.amount));
        }

        CardCommands::List {
            owner,
            page,
            size,
            sort,
        } => {
            let mut request = PageRequest::new(page, size);
            for spec in &sort {
                let parsed = Sort::parse(spec).with_context(|| {
                    format!("Invalid sort '{}'. Use field[,asc|desc] with id, amount or owner", spec)
                })?;
                request = request.with_sort(parsed);
            }

            let result = service
                .page_cash_cards(request, &Principal::card_owner(owner.clone()))
                .await?;

            if result.cards.is_empty() {
                println!("No cash cards found for {} on page {}.", owner, result.page.page);
            } else {
                println!("{:<10} {:>14}", "ID", "AMOUNT");
                println!("{}", "-".repeat(25));
                for card in &result.cards {
                    println!("{:<10} {:>14}", display_id(card), format_cents(card.amount));
                }
                println!(
                    "\nPage {} ({} of {} cards, sorted by {})",
                    result.page.page,
                    result.cards.len(),
                    result.total,
                    result
                        .page
                        .sort
                        .iter()
                        .map(Sort::to_string)
                        .collect::<Vec<_>>()
                        .join("; ")
                );
            }
        }

        CardCommands::Update { id, amount, owner } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '123.45' or '50'")?;
            let card = service
                .update_cash_card(id, Some(amount_cents), &Principal::card_owner(owner))
                .await?;
            println!(
                "Updated cash card {}: {}",
                display_id(&card),
                format_cents(card.amount)
            );
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &CashCardService,
    owner: &str,
    format: &str,
    output: Option<String>,
) -> Result<()> {
    let format = match ExportFormat::from_str(format) {
        Some(format) => format,
        None => bail!("Unknown export format '{}'. Use csv or json", format),
    };

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let count = Exporter::new(service)
        .export(format, owner, writer)
        .await?;

    if let Some(path) = output {
        eprintln!("Exported {} cash card(s) to {}", count, path);
    }
    Ok(())
}

fn display_id(card: &CashCard) -> String {
    card.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into())
}
