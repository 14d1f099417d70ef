//! Invoice (purchase record) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvoiceStatus {
    Pending,
    Completed,
    Paid,
    Cancelled,
    Refunded,
}

impl InvoiceStatus {
    /// Whether invoices in this status count towards sales and commission.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Completed | Self::Paid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub raffle_id: Uuid,
    pub participant_id: Uuid,
    pub package_id: Option<Uuid>,
    /// Referral whose code was used for the purchase.
    pub referral_id: Option<Uuid>,
    /// Ambassador whose code was used for the purchase.
    pub ambassador_id: Option<Uuid>,
    /// Number of tickets purchased.
    pub quantity: u32,
    pub total_price: f64,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoice {
    pub raffle_id: Uuid,
    pub participant_id: Uuid,
    pub package_id: Option<Uuid>,
    pub referral_id: Option<Uuid>,
    pub ambassador_id: Option<Uuid>,
    pub quantity: u32,
    pub total_price: f64,
    /// Defaults to [`InvoiceStatus::Pending`].
    pub status: Option<InvoiceStatus>,
}
