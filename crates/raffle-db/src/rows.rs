//! Helpers shared by the row structs of every repository.

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Projection returning every field plus the record key as `record_id`.
pub(crate) const RECORD_FIELDS: &str = "meta::id(id) AS record_id, *";

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub total: u64,
}

pub(crate) fn parse_uuid(value: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_opt_uuid(value: Option<String>, field: &str) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(&v, field)).transpose()
}

/// First row of a result set, or `NotFound`.
pub(crate) fn first_or_not_found<T>(rows: Vec<T>, entity: &str, id: impl ToString) -> Result<T, DbError> {
    rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: entity.into(),
        id: id.to_string(),
    })
}

/// Total from a `count() ... GROUP ALL` statement (no rows means zero).
pub(crate) fn total(rows: Vec<CountRow>) -> u64 {
    rows.first().map(|r| r.total).unwrap_or(0)
}
