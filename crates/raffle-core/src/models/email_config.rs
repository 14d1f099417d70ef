//! Email provider configuration per tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EmailProvider {
    Resend,
    SendGrid,
    Smtp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub provider: EmailProvider,
    pub from_email: String,
    pub from_name: String,
    pub api_key: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert-or-replace input, keyed by `(tenant, provider)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertEmailConfig {
    pub provider: EmailProvider,
    pub from_email: String,
    pub from_name: String,
    pub api_key: Option<String>,
}
