use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::domain::{CashCard, CashCardId, Cents, PageRequest, Sort, SortField};

use super::MIGRATION_001_INITIAL;

const CASH_CARD_COLUMNS: &str = "id, amount_cents, owner";

/// Repository for persisting and querying cash cards.
///
/// Every read and write that touches an existing card is keyed on the
/// `(id, owner)` pair, so a card is never reachable through another owner.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Insert a new card. Storage assigns the id; any id already on `card` is ignored.
    pub async fn save(&self, card: &CashCard) -> Result<CashCard> {
        let row = sqlx::query(
            r#"
            INSERT INTO cash_cards (amount_cents, owner)
            VALUES (?, ?)
            RETURNING id
            "#,
        )
        .bind(card.amount)
        .bind(&card.owner)
        .fetch_one(&self.pool)
        .await
        .context("Failed to save cash card")?;

        let id: CashCardId = row.get("id");
        Ok(CashCard::new(card.amount, card.owner.clone()).with_id(id))
    }

    /// Get a card by id, only if it belongs to `owner`.
    pub async fn find_by_id_and_owner(
        &self,
        id: CashCardId,
        owner: &str,
    ) -> Result<Option<CashCard>> {
        let query = format!("SELECT {CASH_CARD_COLUMNS} FROM cash_cards WHERE id = ? AND owner = ?");
        let row = sqlx::query(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch cash card")?;

        Ok(row.as_ref().map(Self::row_to_cash_card))
    }

    /// List one page of the cards belonging to `owner`.
    ///
    /// The page's sort is applied as given; callers resolve defaults first.
    pub async fn find_by_owner(&self, owner: &str, page: &PageRequest) -> Result<Vec<CashCard>> {
        let query = format!(
            "SELECT {CASH_CARD_COLUMNS} FROM cash_cards WHERE owner = ? ORDER BY {} LIMIT ? OFFSET ?",
            order_by_clause(&page.sort)
        );

        let rows = sqlx::query(&query)
            .bind(owner)
            .bind(i64::from(page.size))
            .bind(page.offset().context("Page offset out of range")?)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list cash cards")?;

        Ok(rows.iter().map(Self::row_to_cash_card).collect())
    }

    /// List every card belonging to `owner`, in id order.
    pub async fn find_all_by_owner(&self, owner: &str) -> Result<Vec<CashCard>> {
        let query = format!("SELECT {CASH_CARD_COLUMNS} FROM cash_cards WHERE owner = ? ORDER BY id");
        let rows = sqlx::query(&query)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list cash cards for export")?;

        Ok(rows.iter().map(Self::row_to_cash_card).collect())
    }

    /// Count the cards belonging to `owner`.
    pub async fn count_by_owner(&self, owner: &str) -> Result<i64> {
        let count: i64 = sqlx::query("SELECT COUNT(*) as count FROM cash_cards WHERE owner = ?")
            .bind(owner)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count cash cards")?
            .get("count");
        Ok(count)
    }

    /// Replace the amount of a card owned by `owner`.
    ///
    /// Lookup and write happen in one statement. Returns `false` when no card
    /// matched the `(id, owner)` pair.
    pub async fn update_amount(&self, id: CashCardId, owner: &str, amount: Cents) -> Result<bool> {
        let result = sqlx::query("UPDATE cash_cards SET amount_cents = ? WHERE id = ? AND owner = ?")
            .bind(amount)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .context("Failed to update cash card")?;

        Ok(result.rows_affected() == 1)
    }

    fn row_to_cash_card(row: &sqlx::sqlite::SqliteRow) -> CashCard {
        CashCard::new(row.get::<Cents, _>("amount_cents"), row.get::<String, _>("owner"))
            .with_id(row.get("id"))
    }
}

/// Build an ORDER BY list from whitelisted columns, always ending on `id`
/// so that equal sort keys still page deterministically.
fn order_by_clause(sort: &[Sort]) -> String {
    let mut terms: Vec<String> = sort
        .iter()
        .map(|s| format!("{} {}", s.field.column(), s.direction.sql()))
        .collect();

    if !sort.iter().any(|s| s.field == SortField::Id) {
        terms.push("id ASC".to_string());
    }

    terms.join(", ")
}
