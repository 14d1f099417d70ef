//! Admin service error types.

use raffle_core::error::RaffleError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid affiliate code {0:?}: use 3-32 letters, digits, '-' or '_'")]
    InvalidCode(String),

    #[error("range end {end} exceeds the raffle's {total} numbers")]
    RangeOutOfBounds { end: u64, total: u64 },

    #[error("requested {requested} numbers but only {available} are available")]
    InsufficientNumbers { requested: u64, available: u64 },

    #[error("quantity {requested} exceeds the limit of {max}")]
    QuantityTooLarge { requested: u64, max: u64 },

    #[error("raffle {0} has no entries")]
    NoEntries(Uuid),

    #[error("notification request failed: {0}")]
    Notification(String),
}

impl From<AdminError> for RaffleError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Notification(msg) => RaffleError::Notification(msg),
            other => RaffleError::validation(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        AdminError::Notification(err.to_string())
    }
}
