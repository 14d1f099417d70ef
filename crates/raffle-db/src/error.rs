//! Database-specific error types and conversions.

use raffle_core::error::RaffleError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unique constraint violated on {entity}: {detail}")]
    Duplicate { entity: String, detail: String },

    #[error("Invalid stored value: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify an error raised by a statement of a checked response.
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let detail = err.to_string();
        if detail.contains("already contains") {
            DbError::Duplicate {
                entity: entity.into(),
                detail,
            }
        } else {
            DbError::Query(detail)
        }
    }
}

impl From<DbError> for RaffleError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RaffleError::NotFound { entity, id },
            DbError::Duplicate { entity, .. } => RaffleError::AlreadyExists { entity },
            other => RaffleError::Database(other.to_string()),
        }
    }
}
