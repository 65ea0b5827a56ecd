use serde::{Deserialize, Serialize};

use super::{Cents, decimal};

pub type CashCardId = i64;

/// A money-valued record owned by exactly one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashCard {
    /// Assigned by storage; `None` until the card is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CashCardId>,
    #[serde(with = "decimal")]
    pub amount: Cents,
    pub owner: String,
}

impl CashCard {
    pub fn new(amount: Cents, owner: impl Into<String>) -> Self {
        Self {
            id: None,
            amount,
            owner: owner.into(),
        }
    }

    pub fn with_id(mut self, id: CashCardId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_amount(mut self, amount: Cents) -> Self {
        self.amount = amount;
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner == owner
    }
}
