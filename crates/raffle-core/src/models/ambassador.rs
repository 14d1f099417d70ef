//! Ambassador domain model.
//!
//! Ambassadors sell tickets with a personal code and additionally earn a
//! team commission on the sales of the referrals attached to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ambassador {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Personal sales code, unique within the tenant. Stored uppercase.
    pub code: String,
    /// Fraction of qualifying sales paid as personal commission (`0.0..=1.0`).
    pub commission_rate: f64,
    /// Fraction of qualifying sales paid as team commission (`0.0..=1.0`).
    pub team_commission_rate: f64,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAmbassador {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub code: String,
    pub commission_rate: f64,
    pub team_commission_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAmbassador {
    pub name: Option<String>,
    pub email: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub phone: Option<Option<String>>,
    pub code: Option<String>,
    pub commission_rate: Option<f64>,
    pub team_commission_rate: Option<f64>,
    pub is_active: Option<bool>,
    pub email_verified: Option<bool>,
}
