//! Raffle Database: SurrealDB connection management, schema migrations and
//! repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - `Surreal*Repository` implementations of the `raffle-core` traits,
//!   all tenant-scoped ones filtering through one shared predicate

mod connection;
mod error;
mod rows;
mod schema;
mod scope;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{latest_version, run_migrations};
