//! Tenant context: which tenant's rows a caller may see.
//!
//! A [`TenantContext`] is an immutable, request-scoped value passed to every
//! repository and service call. The [`TenantContextStore`] is the
//! per-session holder of the current selection that hands those values out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RaffleError, RaffleResult};
use crate::models::tenant::{Tenant, TenantStatus};

/// The visibility a query runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    /// Only rows of this tenant are visible.
    Tenant(Uuid),
    /// Admin global view: no tenant filter is applied.
    Global,
}

impl TenantScope {
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            Self::Tenant(id) => Some(*id),
            Self::Global => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    tenant_id: Option<Uuid>,
    is_admin: bool,
}

impl TenantContext {
    /// A regular (customer) context bound to one tenant.
    pub fn tenant(tenant_id: Uuid) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            is_admin: false,
        }
    }

    /// An admin context, either viewing one tenant or the global scope.
    pub fn admin(tenant_id: Option<Uuid>) -> Self {
        Self {
            tenant_id,
            is_admin: true,
        }
    }

    pub fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Resolve the read scope.
    ///
    /// A context without a tenant is only meaningful for admins; for anyone
    /// else it is an error rather than an unfiltered query.
    pub fn scope(&self) -> RaffleResult<TenantScope> {
        match (self.tenant_id, self.is_admin) {
            (Some(id), _) => Ok(TenantScope::Tenant(id)),
            (None, true) => Ok(TenantScope::Global),
            (None, false) => Err(RaffleError::TenantContext),
        }
    }

    /// The tenant new rows are stamped with.
    ///
    /// Fails in the global view: there is no tenant to stamp.
    pub fn require_tenant(&self) -> RaffleResult<Uuid> {
        self.tenant_id.ok_or(RaffleError::TenantContext)
    }
}

/// Per-session holder of the currently selected tenant.
///
/// Owned by a single session; mutation needs `&mut self` and the last write
/// wins.
#[derive(Debug, Clone)]
pub struct TenantContextStore {
    current: Option<Uuid>,
    is_admin: bool,
}

impl TenantContextStore {
    /// Session of a tenant user, permanently bound to `home_tenant`.
    pub fn for_tenant(home_tenant: Uuid) -> Self {
        Self {
            current: Some(home_tenant),
            is_admin: false,
        }
    }

    /// Admin session, starting in the global view.
    pub fn for_admin() -> Self {
        Self {
            current: None,
            is_admin: true,
        }
    }

    /// Select a tenant, or `None` for the global admin view.
    pub fn set_current_tenant(&mut self, tenant: Option<&Tenant>) -> RaffleResult<()> {
        let Some(tenant) = tenant else {
            if !self.is_admin {
                return Err(RaffleError::TenantContext);
            }
            self.current = None;
            return Ok(());
        };

        if !self.is_admin && self.current != Some(tenant.id) {
            return Err(RaffleError::AuthorizationDenied {
                reason: "cannot switch to another tenant".into(),
            });
        }

        match tenant.status {
            TenantStatus::Active => {}
            TenantStatus::Suspended if self.is_admin => {}
            TenantStatus::Suspended => {
                return Err(RaffleError::AuthorizationDenied {
                    reason: format!("tenant {} is suspended", tenant.slug),
                });
            }
            TenantStatus::Deleted => {
                return Err(RaffleError::validation(format!(
                    "tenant {} is deleted",
                    tenant.slug
                )));
            }
        }

        self.current = Some(tenant.id);
        Ok(())
    }

    pub fn context(&self) -> TenantContext {
        TenantContext {
            tenant_id: self.current,
            is_admin: self.is_admin,
        }
    }
}
