//! Raffle number assignment (number pool) domain model.
//!
//! A raffle's ticket-number space is partitioned into inclusive integer
//! ranges reserved for a referral or an ambassador. Assigned ranges of the
//! same raffle never overlap.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ranges::NumberRange;

/// Who a range of numbers is reserved for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum AssignmentHolder {
    Referral(Uuid),
    Ambassador(Uuid),
}

impl AssignmentHolder {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Referral(id) | Self::Ambassador(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Referral(_) => "referral",
            Self::Ambassador(_) => "ambassador",
        }
    }
}

impl fmt::Display for AssignmentHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssignmentStatus {
    Assigned,
    Released,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberAssignment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub raffle_id: Uuid,
    pub holder: AssignmentHolder,
    pub range_start: u64,
    pub range_end: u64,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NumberAssignment {
    pub fn range(&self) -> NumberRange {
        NumberRange {
            start: self.range_start,
            end: self.range_end,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Assigned
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNumberAssignment {
    pub raffle_id: Uuid,
    pub holder: AssignmentHolder,
    pub range_start: u64,
    pub range_end: u64,
}

/// An assignment joined with its holder's display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentDetail {
    pub assignment: NumberAssignment,
    pub holder_name: String,
    pub holder_code: String,
}
