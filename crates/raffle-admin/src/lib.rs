//! Raffle Admin: tenant-aware services on top of the repository traits:
//! number pools and number generation, commission reports, affiliate
//! registration with verification notifications, ticket packages, winner
//! selection and tenant selection.

pub mod config;
pub mod error;
pub mod notifier;
pub mod service;

pub use config::AdminConfig;
pub use error::AdminError;
pub use notifier::{
    AffiliateKind, HttpVerificationNotifier, MemoryVerificationNotifier, VerificationNotifier,
    VerificationRequest,
};
pub use service::{
    AffiliateService, CommissionService, GenerateNumbers, NumberPoolService, NumberStats,
    PackageService, TenantService, WinnerService,
};
