use thiserror::Error;

use crate::domain::CashCardId;

#[derive(Error, Debug)]
pub enum AppError {
    /// Lookup miss. Also covers cards owned by someone else, which callers
    /// must not be able to tell apart from missing ones.
    #[error("Cash card not found: {0}")]
    NotFound(CashCardId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid page request: {0}")]
    InvalidPage(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("User {0} is not allowed to access cash cards")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
