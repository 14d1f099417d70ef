//! Referral domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A seller with a personal referral code, optionally part of an
/// ambassador's team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// The ambassador whose team this referral belongs to.
    pub ambassador_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Referral code, unique within the tenant. Stored uppercase.
    pub code: String,
    pub commission_rate: f64,
    pub team_commission_rate: f64,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReferral {
    pub ambassador_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub code: String,
    pub commission_rate: f64,
    pub team_commission_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateReferral {
    /// `Some(Some(id))` = move to team, `Some(None)` = detach, `None` = no change.
    pub ambassador_id: Option<Option<Uuid>>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub code: Option<String>,
    pub commission_rate: Option<f64>,
    pub team_commission_rate: Option<f64>,
    pub is_active: Option<bool>,
    pub email_verified: Option<bool>,
}
