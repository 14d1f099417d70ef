//! Sales and commission aggregation.
//!
//! Commission is never stored; it is recomputed from invoices on every read.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RaffleError, RaffleResult};
use crate::models::ambassador::Ambassador;
use crate::models::invoice::Invoice;
use crate::models::referral::Referral;

/// Commission rates as fractions of qualifying sales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionRates {
    pub commission_rate: f64,
    pub team_commission_rate: f64,
}

impl CommissionRates {
    pub fn new(commission_rate: f64, team_commission_rate: f64) -> RaffleResult<Self> {
        validate_rate("commission rate", commission_rate)?;
        validate_rate("team commission rate", team_commission_rate)?;
        Ok(Self {
            commission_rate,
            team_commission_rate,
        })
    }
}

impl From<&Ambassador> for CommissionRates {
    fn from(a: &Ambassador) -> Self {
        Self {
            commission_rate: a.commission_rate,
            team_commission_rate: a.team_commission_rate,
        }
    }
}

impl From<&Referral> for CommissionRates {
    fn from(r: &Referral) -> Self {
        Self {
            commission_rate: r.commission_rate,
            team_commission_rate: r.team_commission_rate,
        }
    }
}

/// Rates are fractions: `0.1` pays 10 % of sales.
pub fn validate_rate(field: &str, rate: f64) -> RaffleResult<()> {
    if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
        return Err(RaffleError::validation(format!(
            "{field} must be between 0 and 1, got {rate}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CommissionSummary {
    pub total_sales: f64,
    pub personal_commission: f64,
    pub team_commission: f64,
    /// Number of settled invoices that contributed to `total_sales`.
    pub invoice_count: u64,
}

/// Sum of `total_price` over settled (completed or paid) invoices.
pub fn settled_sales<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> (f64, u64) {
    invoices
        .into_iter()
        .filter(|inv| inv.status.is_settled())
        .fold((0.0, 0), |(sum, n), inv| (sum + inv.total_price, n + 1))
}

pub fn summarize<'a>(
    invoices: impl IntoIterator<Item = &'a Invoice>,
    rates: CommissionRates,
) -> CommissionSummary {
    let (total_sales, invoice_count) = settled_sales(invoices);
    CommissionSummary {
        total_sales,
        personal_commission: total_sales * rates.commission_rate,
        team_commission: total_sales * rates.team_commission_rate,
        invoice_count,
    }
}

/// Sales made through one referral of an ambassador's team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberSales {
    pub referral_id: Uuid,
    pub code: String,
    pub total_sales: f64,
    pub invoice_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbassadorCommissionReport {
    pub ambassador_id: Uuid,
    pub summary: CommissionSummary,
    /// Settled sales made with the ambassador's own code.
    pub direct_sales: f64,
    pub team: Vec<TeamMemberSales>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralCommissionReport {
    pub referral_id: Uuid,
    pub summary: CommissionSummary,
}
