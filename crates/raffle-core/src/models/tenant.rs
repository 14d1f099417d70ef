//! Tenant domain model.
//!
//! Tenants provide full data isolation. Every business row (ambassadors,
//! raffles, invoices, provider configuration, ...) belongs to exactly one
//! tenant, directly or through its parent raffle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TenantStatus {
    Active,
    Suspended,
    /// Soft-deleted. Rows are kept but the tenant can no longer be selected.
    Deleted,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TenantPlan {
    Basic,
    Pro,
    Enterprise,
}

/// An isolated customer organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// URL-safe globally unique identifier (e.g., `lucky-club`).
    pub slug: String,
    /// Human-readable name.
    pub name: String,
    pub status: TenantStatus,
    pub plan: TenantPlan,
    /// Arbitrary key-value metadata.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub slug: String,
    pub name: String,
    /// Defaults to [`TenantPlan::Basic`].
    pub plan: Option<TenantPlan>,
    pub metadata: Option<serde_json::Value>,
}

/// Fields that can be updated on an existing tenant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub status: Option<TenantStatus>,
    pub plan: Option<TenantPlan>,
    pub metadata: Option<serde_json::Value>,
}
