use tracing::{debug, info};

use crate::domain::{
    CashCard, CashCardId, Cents, DEFAULT_MAX_PAGE_SIZE, MAX_AMOUNT_CENTS, PAGE_SIZE_LIMIT,
    PageRequest, Principal, default_sort, format_cents,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing the cash card operations.
/// This is the primary interface for any client (HTTP, CLI, tests).
#[derive(Clone)]
pub struct CashCardService {
    repo: Repository,
    max_page_size: u32,
}

/// One page of cards together with the owner's total count.
pub struct CashCardPage {
    pub cards: Vec<CashCard>,
    pub page: PageRequest,
    pub total: i64,
}

impl CashCardService {
    /// Create a new service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Set the largest page size served, kept within `1..=PAGE_SIZE_LIMIT`.
    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size.clamp(1, PAGE_SIZE_LIMIT);
        self
    }

    pub fn max_page_size(&self) -> u32 {
        self.max_page_size
    }

    /// Initialize a database at the given path, creating it if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Get one of the principal's cards.
    pub async fn get_cash_card(
        &self,
        id: CashCardId,
        principal: &Principal,
    ) -> Result<CashCard, AppError> {
        self.repo
            .find_by_id_and_owner(id, principal.name())
            .await?
            .ok_or(AppError::NotFound(id))
    }

    /// Create a card owned by the principal. Storage assigns the id.
    pub async fn create_cash_card(
        &self,
        amount: Option<Cents>,
        principal: &Principal,
    ) -> Result<CashCard, AppError> {
        let amount = validate_amount(amount)?;
        let card = self
            .repo
            .save(&CashCard::new(amount, principal.name()))
            .await?;

        info!(id = ?card.id, owner = %card.owner, "Created cash card");
        Ok(card)
    }

    /// List one page of the principal's cards.
    ///
    /// Sorted ascending by amount unless the request carries its own sort.
    /// A zero size takes the default and an oversized one is capped.
    pub async fn list_cash_cards(
        &self,
        page: PageRequest,
        principal: &Principal,
    ) -> Result<Vec<CashCard>, AppError> {
        let page = self.validate_page(page)?.sort_or(default_sort());
        debug!(owner = %principal.name(), page = page.page, size = page.size, "Listing cash cards");
        Ok(self.repo.find_by_owner(principal.name(), &page).await?)
    }

    /// Like [`list_cash_cards`](Self::list_cash_cards), plus the owner's total.
    pub async fn page_cash_cards(
        &self,
        page: PageRequest,
        principal: &Principal,
    ) -> Result<CashCardPage, AppError> {
        let page = self.validate_page(page)?.sort_or(default_sort());
        let cards = self.repo.find_by_owner(principal.name(), &page).await?;
        let total = self.repo.count_by_owner(principal.name()).await?;
        Ok(CashCardPage { cards, page, total })
    }

    /// Every card of one owner, in id order.
    pub async fn list_all_cash_cards(&self, owner: &str) -> Result<Vec<CashCard>, AppError> {
        Ok(self.repo.find_all_by_owner(owner).await?)
    }

    /// Replace the amount of one of the principal's cards.
    ///
    /// A card that is missing or owned by someone else yields `NotFound`
    /// and nothing is written.
    pub async fn update_cash_card(
        &self,
        id: CashCardId,
        amount: Option<Cents>,
        principal: &Principal,
    ) -> Result<CashCard, AppError> {
        let amount = validate_amount(amount)?;

        if !self
            .repo
            .update_amount(id, principal.name(), amount)
            .await?
        {
            return Err(AppError::NotFound(id));
        }

        info!(id, owner = %principal.name(), "Updated cash card");
        Ok(CashCard::new(amount, principal.name()).with_id(id))
    }

    fn validate_page(&self, page: PageRequest) -> Result<PageRequest, AppError> {
        let page = page.clamp_size(self.max_page_size);
        if page.offset().is_none() {
            return Err(AppError::InvalidPage(format!(
                "page {} is out of range",
                page.page
            )));
        }
        Ok(page)
    }
}

fn validate_amount(amount: Option<Cents>) -> Result<Cents, AppError> {
    match amount {
        None => Err(AppError::InvalidAmount("amount is required".to_string())),
        Some(cents) if cents < 0 => Err(AppError::InvalidAmount(
            "amount must not be negative".to_string(),
        )),
        Some(cents) if cents > MAX_AMOUNT_CENTS => Err(AppError::InvalidAmount(format!(
            "amount must not exceed {}",
            format_cents(MAX_AMOUNT_CENTS)
        ))),
        Some(cents) => Ok(cents),
    }
}
