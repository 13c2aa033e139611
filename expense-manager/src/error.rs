//! Error taxonomy shared by the account store, the ledgers and the aggregator.

use thiserror::Error;

use crate::domain::CategoryId;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or out-of-range caller data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("category '{0}' already exists")]
    DuplicateName(String),

    /// Deliberately silent about which of email or password was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("not found")]
    NotFound,

    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),

    #[error("category {0} belongs to another user")]
    CategoryOwnershipMismatch(CategoryId),

    /// Transient store failure; the caller may retry.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl LedgerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
