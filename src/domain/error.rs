use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RewardsError>;

/// Failure taxonomy for the rewards engine.
#[derive(Debug, Error)]
pub enum RewardsError {
    /// No point value configured for an action key. Non-fatal: the
    /// engine logs it and proceeds with zero points awarded.
    #[error("no points configured for '{key}'")]
    ConfigMissing { key: String },

    /// Transaction contention on a user's rows. Safe to retry: the
    /// whole cycle is idempotent per calendar day and per badge.
    #[error("storage busy, concurrent update in progress")]
    ConcurrencyConflict,

    #[error("storage error: {0}")]
    Storage(#[source] rusqlite::Error),

    #[error("failed to prepare rewards database: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for RewardsError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
            {
                Self::ConcurrencyConflict
            }
            _ => Self::Storage(err),
        }
    }
}
