//! Tenant scoping for SurrealQL statements.
//!
//! Every tenant-scoped repository builds its `WHERE` clause through
//! [`TenantFilter`], so the tenant predicate is applied in one place.

use raffle_core::context::{TenantContext, TenantScope};
use raffle_core::error::RaffleResult;

/// The `tenant_id` predicate for one statement.
#[derive(Debug, Clone)]
pub(crate) struct TenantFilter {
    tenant_id: Option<String>,
}

impl TenantFilter {
    /// Read filter for `ctx`: the context's tenant, or none in the admin
    /// global view.
    pub(crate) fn read(ctx: &TenantContext) -> RaffleResult<Self> {
        let tenant_id = match ctx.scope()? {
            TenantScope::Tenant(id) => Some(id.to_string()),
            TenantScope::Global => None,
        };
        Ok(Self { tenant_id })
    }

    /// Write filter: requires a concrete tenant to stamp rows with.
    pub(crate) fn write(ctx: &TenantContext) -> RaffleResult<Self> {
        Ok(Self {
            tenant_id: Some(ctx.require_tenant()?.to_string()),
        })
    }

    /// Predicate to splice into a `WHERE` clause; binds `$tenant_id`.
    pub(crate) fn clause(&self) -> &'static str {
        if self.tenant_id.is_some() {
            "tenant_id = $tenant_id"
        } else {
            "true"
        }
    }

    /// The `$tenant_id` binding. Unused (and `NONE`) in the global view.
    pub(crate) fn binding(&self) -> (&'static str, Option<String>) {
        ("tenant_id", self.tenant_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raffle_core::error::RaffleError;
    use uuid::Uuid;

    #[test]
    fn tenant_context_filters_by_tenant() {
        let id = Uuid::new_v4();
        let filter = TenantFilter::read(&TenantContext::tenant(id)).unwrap();
        assert_eq!(filter.clause(), "tenant_id = $tenant_id");
        assert_eq!(filter.binding().1, Some(id.to_string()));
    }

    #[test]
    fn global_view_skips_filter() {
        let filter = TenantFilter::read(&TenantContext::admin(None)).unwrap();
        assert_eq!(filter.clause(), "true");
        assert_eq!(filter.binding(), ("tenant_id", None));
    }

    #[test]
    fn global_view_cannot_write() {
        assert!(matches!(
            TenantFilter::write(&TenantContext::admin(None)),
            Err(RaffleError::TenantContext)
        ));
    }

    #[test]
    fn admin_viewing_tenant_is_filtered() {
        let id = Uuid::new_v4();
        let filter = TenantFilter::read(&TenantContext::admin(Some(id))).unwrap();
        assert_eq!(filter.clause(), "tenant_id = $tenant_id");
    }
}
