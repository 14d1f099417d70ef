//! Error types for the raffle admin platform.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RaffleError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Email address is already registered")]
    EmailAlreadyExists,

    #[error("Ambassador code is already in use")]
    DuplicateAmbassadorCode,

    #[error("Referral code is already in use")]
    DuplicateReferralCode,

    #[error("Range conflicts with existing assignment [{start}, {end}]")]
    RangeConflict { start: u64, end: u64 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Tenant context missing or invalid")]
    TenantContext,

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RaffleError {
    /// Shorthand for a [`RaffleError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

pub type RaffleResult<T> = Result<T, RaffleError>;
