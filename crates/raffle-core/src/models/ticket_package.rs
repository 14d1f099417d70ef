//! Ticket package domain model.
//!
//! A package is a purchasable bundle of tickets for one raffle with an
//! optional promotional rule. Pricing lives in [`crate::pricing`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PromotionType {
    None,
    /// `promotion_value` is a percentage taken off the base price.
    Discount,
    /// `promotion_value` extra tickets are added to the package.
    Bonus,
    /// Every ticket bought counts twice.
    #[serde(rename = "2x1")]
    TwoForOne,
    /// Every pair bought yields three tickets.
    #[serde(rename = "3x2")]
    ThreeForTwo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketPackage {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub raffle_id: Uuid,
    pub name: String,
    /// Number of tickets paid for.
    pub amount: u32,
    pub base_price: f64,
    pub promotion_type: PromotionType,
    pub promotion_value: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketPackage {
    pub raffle_id: Uuid,
    pub name: String,
    pub amount: u32,
    pub base_price: f64,
    pub promotion_type: PromotionType,
    pub promotion_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTicketPackage {
    pub name: Option<String>,
    pub amount: Option<u32>,
    pub base_price: Option<f64>,
    pub promotion_type: Option<PromotionType>,
    pub promotion_value: Option<f64>,
    pub is_active: Option<bool>,
}
