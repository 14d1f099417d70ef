//! Ticket package pricing rules.
//!
//! Pure functions over [`PackageTerms`]: how many tickets a package yields
//! and what it costs after its promotion is applied.

use serde::{Deserialize, Serialize};

use crate::error::{RaffleError, RaffleResult};
use crate::models::ticket_package::{CreateTicketPackage, PromotionType, TicketPackage};

/// The priced part of a ticket package.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackageTerms {
    pub amount: u32,
    pub base_price: f64,
    pub promotion_type: PromotionType,
    pub promotion_value: f64,
}

impl From<&TicketPackage> for PackageTerms {
    fn from(pkg: &TicketPackage) -> Self {
        Self {
            amount: pkg.amount,
            base_price: pkg.base_price,
            promotion_type: pkg.promotion_type,
            promotion_value: pkg.promotion_value,
        }
    }
}

impl From<&CreateTicketPackage> for PackageTerms {
    fn from(input: &CreateTicketPackage) -> Self {
        Self {
            amount: input.amount,
            base_price: input.base_price,
            promotion_type: input.promotion_type,
            promotion_value: input.promotion_value,
        }
    }
}

/// What a buyer gets and pays for a package.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackageQuote {
    pub tickets: u64,
    pub price: f64,
}

/// Price after promotion. Only discounts change the price.
pub fn final_price(terms: &PackageTerms) -> f64 {
    match terms.promotion_type {
        PromotionType::Discount => terms.base_price * (1.0 - terms.promotion_value / 100.0),
        _ => terms.base_price,
    }
}

/// Tickets credited for a package.
pub fn total_tickets(terms: &PackageTerms) -> u64 {
    let amount = u64::from(terms.amount);
    match terms.promotion_type {
        PromotionType::Bonus => amount + bonus_tickets(terms.promotion_value),
        PromotionType::TwoForOne => amount * 2,
        PromotionType::ThreeForTwo => (amount / 2) * 3 + amount % 2,
        PromotionType::None | PromotionType::Discount => amount,
    }
}

pub fn quote(terms: &PackageTerms) -> PackageQuote {
    PackageQuote {
        tickets: total_tickets(terms),
        price: final_price(terms),
    }
}

fn bonus_tickets(value: f64) -> u64 {
    // Validated terms hold a non-negative integer here.
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

/// Reject terms that would make pricing meaningless (NaN, negative prices,
/// discounts above 100 %, fractional bonus tickets).
pub fn validate(terms: &PackageTerms) -> RaffleResult<()> {
    if terms.amount == 0 {
        return Err(RaffleError::validation("package amount must be at least 1"));
    }
    if !terms.base_price.is_finite() || terms.base_price < 0.0 {
        return Err(RaffleError::validation(
            "package base price must be a non-negative number",
        ));
    }
    if !terms.promotion_value.is_finite() || terms.promotion_value < 0.0 {
        return Err(RaffleError::validation(
            "promotion value must be a non-negative number",
        ));
    }
    match terms.promotion_type {
        PromotionType::Discount if terms.promotion_value > 100.0 => Err(RaffleError::validation(
            "discount cannot exceed 100 percent",
        )),
        PromotionType::Bonus if terms.promotion_value.fract() != 0.0 => Err(
            RaffleError::validation("bonus tickets must be a whole number"),
        ),
        _ => Ok(()),
    }
}

impl TicketPackage {
    pub fn terms(&self) -> PackageTerms {
        PackageTerms::from(self)
    }

    pub fn final_price(&self) -> f64 {
        final_price(&self.terms())
    }

    pub fn total_tickets(&self) -> u64 {
        total_tickets(&self.terms())
    }
}
