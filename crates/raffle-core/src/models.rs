//! Domain models for the raffle admin platform.
//!
//! These are the core types shared across all crates.

pub mod ambassador;
pub mod email_config;
pub mod invoice;
pub mod number_assignment;
pub mod participant;
pub mod payment_config;
pub mod raffle;
pub mod raffle_entry;
pub mod referral;
pub mod tenant;
pub mod ticket_package;
