//! Admin services. Each is generic over the repository traits it needs,
//! so this crate never depends on the database crate.

pub mod affiliate;
pub mod commission;
pub mod number_pool;
pub mod package;
pub mod tenant;
pub mod winner;

pub use affiliate::AffiliateService;
pub use commission::CommissionService;
pub use number_pool::{GenerateNumbers, NumberPoolService, NumberStats};
pub use package::PackageService;
pub use tenant::TenantService;
pub use winner::WinnerService;

use raffle_core::context::TenantContext;
use uuid::Uuid;

/// Context narrowed to the tenant owning a row already resolved with `ctx`.
///
/// In the admin global view, lookups and writes that follow from that row
/// must stay inside its tenant; a tenant-bound `ctx` is returned unchanged.
pub(crate) fn within_tenant(ctx: &TenantContext, tenant_id: Uuid) -> TenantContext {
    match ctx.tenant_id() {
        Some(_) => *ctx,
        None => TenantContext::admin(Some(tenant_id)),
    }
}
