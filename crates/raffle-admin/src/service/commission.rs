//! Commission reports computed from settled invoices.

use std::collections::HashSet;

use raffle_core::commission::{
    self, AmbassadorCommissionReport, CommissionRates, ReferralCommissionReport, TeamMemberSales,
};
use raffle_core::context::TenantContext;
use raffle_core::error::RaffleResult;
use raffle_core::models::invoice::Invoice;
use raffle_core::repository::{AmbassadorRepository, InvoiceRepository, ReferralRepository};
use tracing::debug;
use uuid::Uuid;

pub struct CommissionService<Am, Rf, I>
where
    Am: AmbassadorRepository,
    Rf: ReferralRepository,
    I: InvoiceRepository,
{
    ambassadors: Am,
    referrals: Rf,
    invoices: I,
}

impl<Am, Rf, I> CommissionService<Am, Rf, I>
where
    Am: AmbassadorRepository,
    Rf: ReferralRepository,
    I: InvoiceRepository,
{
    pub fn new(ambassadors: Am, referrals: Rf, invoices: I) -> Self {
        Self {
            ambassadors,
            referrals,
            invoices,
        }
    }

    /// Sales of the ambassador's own code plus every team member's code.
    ///
    /// An invoice carrying both the ambassador's code and a team referral's
    /// code is counted once.
    pub async fn ambassador_report(
        &self,
        ctx: &TenantContext,
        ambassador_id: Uuid,
    ) -> RaffleResult<AmbassadorCommissionReport> {
        let ambassador = self.ambassadors.get_by_id(ctx, ambassador_id).await?;
        let team = self.referrals.list_by_ambassador(ctx, ambassador.id).await?;
        let team_ids: Vec<Uuid> = team.iter().map(|r| r.id).collect();

        let direct = self.invoices.list_by_ambassador(ctx, ambassador.id).await?;
        let team_invoices = self.invoices.list_by_referrals(ctx, &team_ids).await?;

        let mut seen = HashSet::new();
        let combined: Vec<&Invoice> = direct
            .iter()
            .chain(team_invoices.iter())
            .filter(|inv| seen.insert(inv.id))
            .collect();

        let summary = commission::summarize(combined, CommissionRates::from(&ambassador));
        let (direct_sales, _) = commission::settled_sales(&direct);

        let team = team
            .into_iter()
            .map(|referral| {
                let (total_sales, invoice_count) = commission::settled_sales(
                    team_invoices
                        .iter()
                        .filter(|inv| inv.referral_id == Some(referral.id)),
                );
                TeamMemberSales {
                    referral_id: referral.id,
                    code: referral.code,
                    total_sales,
                    invoice_count,
                }
            })
            .collect();

        debug!(
            %ambassador_id,
            total_sales = summary.total_sales,
            invoices = summary.invoice_count,
            "Computed ambassador commission"
        );

        Ok(AmbassadorCommissionReport {
            ambassador_id: ambassador.id,
            summary,
            direct_sales,
            team,
        })
    }

    pub async fn referral_report(
        &self,
        ctx: &TenantContext,
        referral_id: Uuid,
    ) -> RaffleResult<ReferralCommissionReport> {
        let referral = self.referrals.get_by_id(ctx, referral_id).await?;
        let invoices = self.invoices.list_by_referrals(ctx, &[referral.id]).await?;

        Ok(ReferralCommissionReport {
            referral_id: referral.id,
            summary: commission::summarize(&invoices, CommissionRates::from(&referral)),
        })
    }
}
