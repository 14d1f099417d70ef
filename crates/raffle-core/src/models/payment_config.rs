//! Payment provider configuration per tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentProvider {
    Stripe,
    PayPal,
    MercadoPago,
    /// Offline payments confirmed by an administrator.
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub provider: PaymentProvider,
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    pub sandbox: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert-or-replace input, keyed by `(tenant, provider)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertPaymentConfig {
    pub provider: PaymentProvider,
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    pub sandbox: bool,
}
