//! Tenant administration and per-session tenant selection.

use raffle_core::context::{TenantContext, TenantContextStore};
use raffle_core::error::{RaffleError, RaffleResult};
use raffle_core::models::tenant::{CreateTenant, Tenant, UpdateTenant};
use raffle_core::repository::{PaginatedResult, Pagination, TenantRepository};
use tracing::info;
use uuid::Uuid;

/// Lowercase letters, digits and inner hyphens, 2 to 63 characters.
pub fn validate_slug(slug: &str) -> RaffleResult<()> {
    let valid = (2..=63).contains(&slug.len())
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-');
    if !valid {
        return Err(RaffleError::validation(format!("invalid tenant slug {slug:?}")));
    }
    Ok(())
}

fn require_admin(ctx: &TenantContext) -> RaffleResult<()> {
    if !ctx.is_admin() {
        return Err(RaffleError::AuthorizationDenied {
            reason: "tenant administration requires an admin".into(),
        });
    }
    Ok(())
}

pub struct TenantService<T: TenantRepository> {
    tenants: T,
}

impl<T: TenantRepository> TenantService<T> {
    pub fn new(tenants: T) -> Self {
        Self { tenants }
    }

    pub async fn create_tenant(&self, ctx: &TenantContext, input: CreateTenant) -> RaffleResult<Tenant> {
        require_admin(ctx)?;
        validate_slug(&input.slug)?;
        if input.name.trim().is_empty() {
            return Err(RaffleError::validation("tenant name must not be empty"));
        }
        let tenant = self.tenants.create(input).await?;
        info!(tenant_id = %tenant.id, slug = %tenant.slug, "Tenant created");
        Ok(tenant)
    }

    pub async fn update_tenant(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateTenant,
    ) -> RaffleResult<Tenant> {
        require_admin(ctx)?;
        if let Some(slug) = input.slug.as_deref() {
            validate_slug(slug)?;
        }
        let tenant = self.tenants.update(id, input).await?;
        info!(tenant_id = %id, status = ?tenant.status, "Tenant updated");
        Ok(tenant)
    }

    /// Soft delete.
    pub async fn delete_tenant(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        require_admin(ctx)?;
        self.tenants.delete(id).await?;
        info!(tenant_id = %id, "Tenant deleted");
        Ok(())
    }

    pub async fn list_tenants(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> RaffleResult<PaginatedResult<Tenant>> {
        require_admin(ctx)?;
        self.tenants.list(pagination).await
    }

    /// Switch a session to `tenant_id`, or to the admin global view with
    /// `None`, and return the context for subsequent calls.
    pub async fn select(
        &self,
        store: &mut TenantContextStore,
        tenant_id: Option<Uuid>,
    ) -> RaffleResult<TenantContext> {
        let tenant = match tenant_id {
            Some(id) => Some(self.tenants.get_by_id(id).await?),
            None => None,
        };
        store.set_current_tenant(tenant.as_ref())?;
        let ctx = store.context();
        info!(tenant_id = ?ctx.tenant_id(), admin = ctx.is_admin(), "Tenant selected");
        Ok(ctx)
    }

    pub async fn select_by_slug(
        &self,
        store: &mut TenantContextStore,
        slug: &str,
    ) -> RaffleResult<TenantContext> {
        let tenant = self.tenants.get_by_slug(slug).await?;
        store.set_current_tenant(Some(&tenant))?;
        info!(tenant_id = %tenant.id, slug = %tenant.slug, "Tenant selected");
        Ok(store.context())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert!(validate_slug("lucky-club").is_ok());
        assert!(validate_slug("c7").is_ok());
        for bad in ["", "a", "Lucky", "-lead", "trail-", "under_score", "sp ace"] {
            assert!(validate_slug(bad).is_err(), "{bad:?}");
        }
    }
}
