//! SurrealDB repository implementations.

mod ambassador;
mod email_config;
mod invoice;
mod number_assignment;
mod participant;
mod payment_config;
mod raffle;
mod raffle_entry;
mod referral;
mod tenant;
mod ticket_package;

pub use ambassador::SurrealAmbassadorRepository;
pub use email_config::SurrealEmailConfigRepository;
pub use invoice::SurrealInvoiceRepository;
pub use number_assignment::SurrealNumberAssignmentRepository;
pub use participant::SurrealParticipantRepository;
pub use payment_config::SurrealPaymentConfigRepository;
pub use raffle::SurrealRaffleRepository;
pub use raffle_entry::SurrealRaffleEntryRepository;
pub use referral::SurrealReferralRepository;
pub use tenant::SurrealTenantRepository;
pub use ticket_package::SurrealTicketPackageRepository;
