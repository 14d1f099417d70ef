//! Raffle Core: domain models, tenant context, repository traits and the
//! pure business rules (pricing, commission, number ranges) shared by all
//! crates of the raffle admin platform.

pub mod commission;
pub mod context;
pub mod error;
pub mod models;
pub mod pricing;
pub mod ranges;
pub mod repository;

pub use context::{TenantContext, TenantContextStore, TenantScope};
pub use error::{RaffleError, RaffleResult};
