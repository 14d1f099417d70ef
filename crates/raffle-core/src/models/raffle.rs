//! Raffle domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RaffleStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

/// A raffle whose ticket numbers span `1..=total_numbers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Raffle {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: RaffleStatus,
    pub total_numbers: u64,
    /// Price of a single ticket bought outside a package.
    pub ticket_price: f64,
    pub draw_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRaffle {
    pub title: String,
    pub description: Option<String>,
    pub total_numbers: u64,
    pub ticket_price: f64,
    pub draw_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRaffle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<RaffleStatus>,
    pub total_numbers: Option<u64>,
    pub ticket_price: Option<f64>,
    pub draw_date: Option<Option<DateTime<Utc>>>,
}
