//! Affiliate (ambassador and referral) registration and maintenance.

use raffle_core::commission::CommissionRates;
use raffle_core::context::TenantContext;
use raffle_core::error::{RaffleError, RaffleResult};
use raffle_core::models::ambassador::{Ambassador, CreateAmbassador, UpdateAmbassador};
use raffle_core::models::referral::{CreateReferral, Referral, UpdateReferral};
use raffle_core::repository::{AmbassadorRepository, ReferralRepository};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::error::AdminError;
use crate::notifier::{AffiliateKind, VerificationNotifier, VerificationRequest};
use crate::service::within_tenant;

const CODE_MIN_LEN: usize = 3;
const CODE_MAX_LEN: usize = 32;

/// Trim and uppercase an affiliate code, then check its syntax.
pub fn normalize_code(code: &str) -> Result<String, AdminError> {
    let code = code.trim().to_uppercase();
    let valid_len = (CODE_MIN_LEN..=CODE_MAX_LEN).contains(&code.len());
    let valid_chars = code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid_len || !valid_chars {
        return Err(AdminError::InvalidCode(code));
    }
    Ok(code)
}

pub fn normalize_email(email: &str) -> RaffleResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(RaffleError::validation(format!("invalid email address {email:?}"))),
    }
}

fn require_name(name: &str) -> RaffleResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RaffleError::validation("name must not be empty"));
    }
    Ok(name.to_string())
}

/// Turn a lookup's `NotFound` into `None`.
fn found<T>(result: RaffleResult<T>) -> RaffleResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RaffleError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Registers affiliates and asks the storefront to send them a
/// verification email.
pub struct AffiliateService<Am, Rf, N>
where
    Am: AmbassadorRepository,
    Rf: ReferralRepository,
    N: VerificationNotifier,
{
    ambassadors: Am,
    referrals: Rf,
    notifier: N,
    config: AdminConfig,
}

impl<Am, Rf, N> AffiliateService<Am, Rf, N>
where
    Am: AmbassadorRepository,
    Rf: ReferralRepository,
    N: VerificationNotifier,
{
    pub fn new(ambassadors: Am, referrals: Rf, notifier: N, config: AdminConfig) -> Self {
        Self {
            ambassadors,
            referrals,
            notifier,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Ambassadors
    // -----------------------------------------------------------------------

    async fn check_ambassador_unique(
        &self,
        ctx: &TenantContext,
        email: Option<&str>,
        code: Option<&str>,
        exclude: Option<Uuid>,
    ) -> RaffleResult<()> {
        if let Some(email) = email {
            let existing = found(self.ambassadors.get_by_email(ctx, email).await)?;
            if existing.is_some_and(|a| Some(a.id) != exclude) {
                return Err(RaffleError::EmailAlreadyExists);
            }
        }
        if let Some(code) = code {
            let existing = found(self.ambassadors.get_by_code(ctx, code).await)?;
            if existing.is_some_and(|a| Some(a.id) != exclude) {
                return Err(RaffleError::DuplicateAmbassadorCode);
            }
        }
        Ok(())
    }

    pub async fn register_ambassador(
        &self,
        ctx: &TenantContext,
        input: CreateAmbassador,
    ) -> RaffleResult<Ambassador> {
        ctx.require_tenant()?;
        let code = normalize_code(&input.code)?;
        let email = normalize_email(&input.email)?;
        let name = require_name(&input.name)?;
        CommissionRates::new(input.commission_rate, input.team_commission_rate)?;

        self.check_ambassador_unique(ctx, Some(&email), Some(&code), None)
            .await?;

        let ambassador = self
            .ambassadors
            .create(
                ctx,
                CreateAmbassador {
                    name,
                    email,
                    code,
                    ..input
                },
            )
            .await?;
        info!(
            tenant_id = %ambassador.tenant_id,
            ambassador_id = %ambassador.id,
            code = %ambassador.code,
            "Ambassador registered"
        );

        self.notify(
            AffiliateKind::Ambassador,
            ambassador.id,
            ambassador.tenant_id,
            &ambassador.code,
        )
        .await;
        Ok(ambassador)
    }

    /// Update an ambassador. A changed email resets its verification.
    pub async fn update_ambassador(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        mut input: UpdateAmbassador,
    ) -> RaffleResult<Ambassador> {
        let current = self.ambassadors.get_by_id(ctx, id).await?;
        let scoped = within_tenant(ctx, current.tenant_id);

        if let Some(code) = input.code.as_deref() {
            input.code = Some(normalize_code(code)?);
        }
        if let Some(email) = input.email.as_deref() {
            let email = normalize_email(email)?;
            if email != current.email {
                input.email_verified = Some(false);
            }
            input.email = Some(email);
        }
        if let Some(name) = input.name.as_deref() {
            input.name = Some(require_name(name)?);
        }
        CommissionRates::new(
            input.commission_rate.unwrap_or(current.commission_rate),
            input
                .team_commission_rate
                .unwrap_or(current.team_commission_rate),
        )?;

        self.check_ambassador_unique(&scoped, input.email.as_deref(), input.code.as_deref(), Some(id))
            .await?;

        let updated = self.ambassadors.update(ctx, id, input).await?;
        info!(ambassador_id = %id, "Ambassador updated");
        Ok(updated)
    }

    /// Delete an ambassador. Team referrals are kept and detached.
    pub async fn delete_ambassador(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        let ambassador = self.ambassadors.get_by_id(ctx, id).await?;
        let team = self.referrals.list_by_ambassador(ctx, ambassador.id).await?;
        for referral in &team {
            self.referrals
                .update(
                    ctx,
                    referral.id,
                    UpdateReferral {
                        ambassador_id: Some(None),
                        ..Default::default()
                    },
                )
                .await?;
        }
        self.ambassadors.delete(ctx, ambassador.id).await?;
        info!(ambassador_id = %id, detached = team.len(), "Ambassador deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Referrals
    // -----------------------------------------------------------------------

    async fn check_referral_unique(
        &self,
        ctx: &TenantContext,
        email: Option<&str>,
        code: Option<&str>,
        exclude: Option<Uuid>,
    ) -> RaffleResult<()> {
        if let Some(email) = email {
            let existing = found(self.referrals.get_by_email(ctx, email).await)?;
            if existing.is_some_and(|r| Some(r.id) != exclude) {
                return Err(RaffleError::EmailAlreadyExists);
            }
        }
        if let Some(code) = code {
            let existing = found(self.referrals.get_by_code(ctx, code).await)?;
            if existing.is_some_and(|r| Some(r.id) != exclude) {
                return Err(RaffleError::DuplicateReferralCode);
            }
        }
        Ok(())
    }

    /// The team's ambassador must be visible in the context's tenant.
    async fn check_team(&self, ctx: &TenantContext, ambassador_id: Option<Uuid>) -> RaffleResult<()> {
        if let Some(ambassador_id) = ambassador_id {
            self.ambassadors.get_by_id(ctx, ambassador_id).await?;
        }
        Ok(())
    }

    pub async fn register_referral(
        &self,
        ctx: &TenantContext,
        input: CreateReferral,
    ) -> RaffleResult<Referral> {
        ctx.require_tenant()?;
        let code = normalize_code(&input.code)?;
        let email = normalize_email(&input.email)?;
        let name = require_name(&input.name)?;
        CommissionRates::new(input.commission_rate, input.team_commission_rate)?;

        self.check_team(ctx, input.ambassador_id).await?;
        self.check_referral_unique(ctx, Some(&email), Some(&code), None)
            .await?;

        let referral = self
            .referrals
            .create(
                ctx,
                CreateReferral {
                    name,
                    email,
                    code,
                    ..input
                },
            )
            .await?;
        info!(
            tenant_id = %referral.tenant_id,
            referral_id = %referral.id,
            code = %referral.code,
            ambassador_id = ?referral.ambassador_id,
            "Referral registered"
        );

        self.notify(
            AffiliateKind::Referral,
            referral.id,
            referral.tenant_id,
            &referral.code,
        )
        .await;
        Ok(referral)
    }

    /// Update a referral. A changed email resets its verification.
    pub async fn update_referral(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        mut input: UpdateReferral,
    ) -> RaffleResult<Referral> {
        let current = self.referrals.get_by_id(ctx, id).await?;
        let scoped = within_tenant(ctx, current.tenant_id);

        if let Some(code) = input.code.as_deref() {
            input.code = Some(normalize_code(code)?);
        }
        if let Some(email) = input.email.as_deref() {
            let email = normalize_email(email)?;
            if email != current.email {
                input.email_verified = Some(false);
            }
            input.email = Some(email);
        }
        if let Some(name) = input.name.as_deref() {
            input.name = Some(require_name(name)?);
        }
        if let Some(team) = input.ambassador_id {
            self.check_team(&scoped, team).await?;
        }
        CommissionRates::new(
            input.commission_rate.unwrap_or(current.commission_rate),
            input
                .team_commission_rate
                .unwrap_or(current.team_commission_rate),
        )?;

        self.check_referral_unique(&scoped, input.email.as_deref(), input.code.as_deref(), Some(id))
            .await?;

        let updated = self.referrals.update(ctx, id, input).await?;
        info!(referral_id = %id, "Referral updated");
        Ok(updated)
    }

    pub async fn delete_referral(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        self.referrals.delete(ctx, id).await?;
        info!(referral_id = %id, "Referral deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Both kinds
    // -----------------------------------------------------------------------

    pub async fn verify_email(&self, ctx: &TenantContext, kind: AffiliateKind, id: Uuid) -> RaffleResult<()> {
        match kind {
            AffiliateKind::Ambassador => {
                self.ambassadors
                    .update(
                        ctx,
                        id,
                        UpdateAmbassador {
                            email_verified: Some(true),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            AffiliateKind::Referral => {
                self.referrals
                    .update(
                        ctx,
                        id,
                        UpdateReferral {
                            email_verified: Some(true),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
        }
        info!(kind = kind.as_str(), %id, "Affiliate email verified");
        Ok(())
    }

    /// Activate or deactivate an affiliate without touching other fields.
    pub async fn set_active(
        &self,
        ctx: &TenantContext,
        kind: AffiliateKind,
        id: Uuid,
        active: bool,
    ) -> RaffleResult<()> {
        match kind {
            AffiliateKind::Ambassador => {
                self.ambassadors
                    .update(
                        ctx,
                        id,
                        UpdateAmbassador {
                            is_active: Some(active),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            AffiliateKind::Referral => {
                self.referrals
                    .update(
                        ctx,
                        id,
                        UpdateReferral {
                            is_active: Some(active),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
        }
        info!(kind = kind.as_str(), %id, active, "Affiliate activation changed");
        Ok(())
    }

    /// Send the verification request. Failures are logged, never returned:
    /// the affiliate row already exists and registration has succeeded.
    async fn notify(&self, kind: AffiliateKind, id: Uuid, tenant_id: Uuid, code: &str) {
        let request = VerificationRequest::new(self.config.base(), kind, id, tenant_id, code);
        match self.notifier.send_verification(kind, &request).await {
            Ok(()) => info!(kind = kind.as_str(), %id, "Verification requested"),
            Err(e) => warn!(
                kind = kind.as_str(),
                %id,
                error = %e,
                "Verification request failed"
            ),
        }
    }
}
