//! Raffle entry domain model.
//!
//! Entries carry no `tenant_id`; they are scoped through their raffle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ticket number owned by a participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaffleEntry {
    pub id: Uuid,
    pub raffle_id: Uuid,
    pub participant_id: Uuid,
    pub invoice_id: Option<Uuid>,
    pub ticket_number: u64,
    pub is_winner: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRaffleEntry {
    pub raffle_id: Uuid,
    pub participant_id: Uuid,
    pub invoice_id: Option<Uuid>,
    pub ticket_number: u64,
}
