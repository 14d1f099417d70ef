//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories take a
//! [`TenantContext`]: reads are filtered to the context's tenant (or left
//! unfiltered in the admin global view) and creates are stamped with the
//! context's tenant.

use uuid::Uuid;

use crate::context::TenantContext;
use crate::error::RaffleResult;
use crate::models::{
    ambassador::{Ambassador, CreateAmbassador, UpdateAmbassador},
    email_config::{EmailConfig, EmailProvider, UpsertEmailConfig},
    invoice::{CreateInvoice, Invoice, InvoiceStatus},
    number_assignment::{
        AssignmentHolder, AssignmentStatus, CreateNumberAssignment, NumberAssignment,
    },
    participant::{CreateParticipant, Participant},
    payment_config::{PaymentConfig, PaymentProvider, UpsertPaymentConfig},
    raffle::{CreateRaffle, Raffle, UpdateRaffle},
    raffle_entry::{CreateRaffleEntry, RaffleEntry},
    referral::{CreateReferral, Referral, UpdateReferral},
    tenant::{CreateTenant, Tenant, UpdateTenant},
    ticket_package::{CreateTicketPackage, TicketPackage, UpdateTicketPackage},
};
use crate::ranges::NumberRange;

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenant (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = RaffleResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RaffleResult<Tenant>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = RaffleResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = RaffleResult<Tenant>> + Send;
    /// Soft-delete: sets status to Deleted.
    fn delete(&self, id: Uuid) -> impl Future<Output = RaffleResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = RaffleResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Affiliates (tenant-scoped)
// ---------------------------------------------------------------------------

pub trait AmbassadorRepository: Send + Sync {
    fn create(
        &self,
        ctx: &TenantContext,
        input: CreateAmbassador,
    ) -> impl Future<Output = RaffleResult<Ambassador>> + Send;
    fn get_by_id(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<Ambassador>> + Send;
    fn get_by_code(
        &self,
        ctx: &TenantContext,
        code: &str,
    ) -> impl Future<Output = RaffleResult<Ambassador>> + Send;
    fn get_by_email(
        &self,
        ctx: &TenantContext,
        email: &str,
    ) -> impl Future<Output = RaffleResult<Ambassador>> + Send;
    fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateAmbassador,
    ) -> impl Future<Output = RaffleResult<Ambassador>> + Send;
    fn delete(&self, ctx: &TenantContext, id: Uuid)
    -> impl Future<Output = RaffleResult<()>> + Send;
    fn list(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> impl Future<Output = RaffleResult<PaginatedResult<Ambassador>>> + Send;
}

pub trait ReferralRepository: Send + Sync {
    fn create(
        &self,
        ctx: &TenantContext,
        input: CreateReferral,
    ) -> impl Future<Output = RaffleResult<Referral>> + Send;
    fn get_by_id(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<Referral>> + Send;
    fn get_by_code(
        &self,
        ctx: &TenantContext,
        code: &str,
    ) -> impl Future<Output = RaffleResult<Referral>> + Send;
    fn get_by_email(
        &self,
        ctx: &TenantContext,
        email: &str,
    ) -> impl Future<Output = RaffleResult<Referral>> + Send;
    fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateReferral,
    ) -> impl Future<Output = RaffleResult<Referral>> + Send;
    fn delete(&self, ctx: &TenantContext, id: Uuid)
    -> impl Future<Output = RaffleResult<()>> + Send;
    fn list(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> impl Future<Output = RaffleResult<PaginatedResult<Referral>>> + Send;
    /// All referrals on an ambassador's team.
    fn list_by_ambassador(
        &self,
        ctx: &TenantContext,
        ambassador_id: Uuid,
    ) -> impl Future<Output = RaffleResult<Vec<Referral>>> + Send;
}

// ---------------------------------------------------------------------------
// Raffles, packages and number pools (tenant-scoped)
// ---------------------------------------------------------------------------

pub trait RaffleRepository: Send + Sync {
    fn create(
        &self,
        ctx: &TenantContext,
        input: CreateRaffle,
    ) -> impl Future<Output = RaffleResult<Raffle>> + Send;
    fn get_by_id(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<Raffle>> + Send;
    fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateRaffle,
    ) -> impl Future<Output = RaffleResult<Raffle>> + Send;
    fn delete(&self, ctx: &TenantContext, id: Uuid)
    -> impl Future<Output = RaffleResult<()>> + Send;
    fn list(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> impl Future<Output = RaffleResult<PaginatedResult<Raffle>>> + Send;
}

pub trait TicketPackageRepository: Send + Sync {
    fn create(
        &self,
        ctx: &TenantContext,
        input: CreateTicketPackage,
    ) -> impl Future<Output = RaffleResult<TicketPackage>> + Send;
    fn get_by_id(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<TicketPackage>> + Send;
    fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateTicketPackage,
    ) -> impl Future<Output = RaffleResult<TicketPackage>> + Send;
    fn delete(&self, ctx: &TenantContext, id: Uuid)
    -> impl Future<Output = RaffleResult<()>> + Send;
    /// Packages of a raffle ordered by amount.
    fn list_by_raffle(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
    ) -> impl Future<Output = RaffleResult<Vec<TicketPackage>>> + Send;
}

pub trait NumberAssignmentRepository: Send + Sync {
    /// Insert without overlap validation; callers check first.
    fn create(
        &self,
        ctx: &TenantContext,
        input: CreateNumberAssignment,
    ) -> impl Future<Output = RaffleResult<NumberAssignment>> + Send;
    fn get_by_id(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<NumberAssignment>> + Send;
    /// Assignments of a raffle ordered by `range_start`.
    fn list_by_raffle(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        status: Option<AssignmentStatus>,
    ) -> impl Future<Output = RaffleResult<Vec<NumberAssignment>>> + Send;
    /// Assigned (active) ranges of a raffle intersecting `range`, ordered by
    /// `range_start`.
    fn find_overlapping(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        range: NumberRange,
    ) -> impl Future<Output = RaffleResult<Vec<NumberAssignment>>> + Send;
    /// Assigned (active) ranges held by `holder` in a raffle.
    fn list_by_holder(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        holder: AssignmentHolder,
    ) -> impl Future<Output = RaffleResult<Vec<NumberAssignment>>> + Send;
    fn set_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        status: AssignmentStatus,
    ) -> impl Future<Output = RaffleResult<NumberAssignment>> + Send;
    fn delete(&self, ctx: &TenantContext, id: Uuid)
    -> impl Future<Output = RaffleResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Sales (tenant-scoped)
// ---------------------------------------------------------------------------

pub trait ParticipantRepository: Send + Sync {
    fn create(
        &self,
        ctx: &TenantContext,
        input: CreateParticipant,
    ) -> impl Future<Output = RaffleResult<Participant>> + Send;
    fn get_by_id(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<Participant>> + Send;
    fn get_by_email(
        &self,
        ctx: &TenantContext,
        email: &str,
    ) -> impl Future<Output = RaffleResult<Participant>> + Send;
    fn list(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> impl Future<Output = RaffleResult<PaginatedResult<Participant>>> + Send;
}

pub trait InvoiceRepository: Send + Sync {
    fn create(
        &self,
        ctx: &TenantContext,
        input: CreateInvoice,
    ) -> impl Future<Output = RaffleResult<Invoice>> + Send;
    fn get_by_id(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<Invoice>> + Send;
    fn update_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        status: InvoiceStatus,
    ) -> impl Future<Output = RaffleResult<Invoice>> + Send;
    fn list_by_raffle(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = RaffleResult<PaginatedResult<Invoice>>> + Send;
    /// Invoices sold with the ambassador's own code.
    fn list_by_ambassador(
        &self,
        ctx: &TenantContext,
        ambassador_id: Uuid,
    ) -> impl Future<Output = RaffleResult<Vec<Invoice>>> + Send;
    /// Invoices sold with any of the given referral codes.
    fn list_by_referrals(
        &self,
        ctx: &TenantContext,
        referral_ids: &[Uuid],
    ) -> impl Future<Output = RaffleResult<Vec<Invoice>>> + Send;
}

/// Raffle entries have no `tenant_id` column.
///
/// This repository is NOT tenant-scoped: callers must resolve the raffle
/// through [`RaffleRepository::get_by_id`] with their context first and
/// only then address its entries.
pub trait RaffleEntryRepository: Send + Sync {
    fn create(
        &self,
        input: CreateRaffleEntry,
    ) -> impl Future<Output = RaffleResult<RaffleEntry>> + Send;
    fn get_by_id(
        &self,
        raffle_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<RaffleEntry>> + Send;
    /// Entries ordered by ticket number.
    fn list_by_raffle(
        &self,
        raffle_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = RaffleResult<PaginatedResult<RaffleEntry>>> + Send;
    fn list_by_participant(
        &self,
        raffle_id: Uuid,
        participant_id: Uuid,
    ) -> impl Future<Output = RaffleResult<Vec<RaffleEntry>>> + Send;
    /// Every sold ticket number of the raffle.
    fn ticket_numbers(&self, raffle_id: Uuid)
    -> impl Future<Output = RaffleResult<Vec<u64>>> + Send;
    /// Number of sold tickets, optionally restricted to a range.
    fn count(
        &self,
        raffle_id: Uuid,
        range: Option<NumberRange>,
    ) -> impl Future<Output = RaffleResult<u64>> + Send;
    /// The entry at `index` when entries are ordered by ticket number.
    fn nth(
        &self,
        raffle_id: Uuid,
        index: u64,
    ) -> impl Future<Output = RaffleResult<RaffleEntry>> + Send;
    /// Mark an entry as the winner, clearing any previous winner of the raffle.
    fn set_winner(
        &self,
        raffle_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<RaffleEntry>> + Send;
    fn clear_winner(
        &self,
        raffle_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<RaffleEntry>> + Send;
    fn get_winner(
        &self,
        raffle_id: Uuid,
    ) -> impl Future<Output = RaffleResult<Option<RaffleEntry>>> + Send;
}

// ---------------------------------------------------------------------------
// Provider configuration (tenant-scoped)
// ---------------------------------------------------------------------------

pub trait PaymentConfigRepository: Send + Sync {
    /// Insert or replace the configuration for `(tenant, provider)`.
    fn upsert(
        &self,
        ctx: &TenantContext,
        input: UpsertPaymentConfig,
    ) -> impl Future<Output = RaffleResult<PaymentConfig>> + Send;
    fn get_by_provider(
        &self,
        ctx: &TenantContext,
        provider: PaymentProvider,
    ) -> impl Future<Output = RaffleResult<PaymentConfig>> + Send;
    fn get_active(
        &self,
        ctx: &TenantContext,
    ) -> impl Future<Output = RaffleResult<Option<PaymentConfig>>> + Send;
    fn list(
        &self,
        ctx: &TenantContext,
    ) -> impl Future<Output = RaffleResult<Vec<PaymentConfig>>> + Send;
    /// Activate one configuration and deactivate the tenant's others.
    fn activate(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<PaymentConfig>> + Send;
    fn delete(&self, ctx: &TenantContext, id: Uuid)
    -> impl Future<Output = RaffleResult<()>> + Send;
}

pub trait EmailConfigRepository: Send + Sync {
    /// Insert or replace the configuration for `(tenant, provider)`.
    fn upsert(
        &self,
        ctx: &TenantContext,
        input: UpsertEmailConfig,
    ) -> impl Future<Output = RaffleResult<EmailConfig>> + Send;
    fn get_by_provider(
        &self,
        ctx: &TenantContext,
        provider: EmailProvider,
    ) -> impl Future<Output = RaffleResult<EmailConfig>> + Send;
    fn get_active(
        &self,
        ctx: &TenantContext,
    ) -> impl Future<Output = RaffleResult<Option<EmailConfig>>> + Send;
    fn list(
        &self,
        ctx: &TenantContext,
    ) -> impl Future<Output = RaffleResult<Vec<EmailConfig>>> + Send;
    /// Activate one configuration and deactivate the tenant's others.
    fn activate(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = RaffleResult<EmailConfig>> + Send;
    fn delete(&self, ctx: &TenantContext, id: Uuid)
    -> impl Future<Output = RaffleResult<()>> + Send;
}
