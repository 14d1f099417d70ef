//! Ticket packages with validated pricing terms.

use raffle_core::context::TenantContext;
use raffle_core::error::{RaffleError, RaffleResult};
use raffle_core::models::ticket_package::{
    CreateTicketPackage, TicketPackage, UpdateTicketPackage,
};
use raffle_core::pricing::{self, PackageQuote, PackageTerms};
use raffle_core::repository::{RaffleRepository, TicketPackageRepository};
use tracing::info;
use uuid::Uuid;

pub struct PackageService<R, P>
where
    R: RaffleRepository,
    P: TicketPackageRepository,
{
    raffles: R,
    packages: P,
}

impl<R, P> PackageService<R, P>
where
    R: RaffleRepository,
    P: TicketPackageRepository,
{
    pub fn new(raffles: R, packages: P) -> Self {
        Self { raffles, packages }
    }

    pub async fn create_package(
        &self,
        ctx: &TenantContext,
        input: CreateTicketPackage,
    ) -> RaffleResult<TicketPackage> {
        if input.name.trim().is_empty() {
            return Err(RaffleError::validation("package name must not be empty"));
        }
        pricing::validate(&PackageTerms::from(&input))?;
        let raffle = self.raffles.get_by_id(ctx, input.raffle_id).await?;

        let package = self.packages.create(ctx, input).await?;
        info!(
            raffle_id = %raffle.id,
            package_id = %package.id,
            tickets = package.total_tickets(),
            price = package.final_price(),
            "Ticket package created"
        );
        Ok(package)
    }

    /// Apply a partial update; the merged terms must still be valid.
    pub async fn update_package(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateTicketPackage,
    ) -> RaffleResult<TicketPackage> {
        let current = self.packages.get_by_id(ctx, id).await?;
        if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(RaffleError::validation("package name must not be empty"));
        }

        let merged = PackageTerms {
            amount: input.amount.unwrap_or(current.amount),
            base_price: input.base_price.unwrap_or(current.base_price),
            promotion_type: input.promotion_type.unwrap_or(current.promotion_type),
            promotion_value: input.promotion_value.unwrap_or(current.promotion_value),
        };
        pricing::validate(&merged)?;

        let updated = self.packages.update(ctx, id, input).await?;
        info!(package_id = %id, "Ticket package updated");
        Ok(updated)
    }

    pub async fn delete_package(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        self.packages.delete(ctx, id).await?;
        info!(package_id = %id, "Ticket package deleted");
        Ok(())
    }

    /// Tickets and price a buyer gets for a stored package.
    pub async fn quote(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<PackageQuote> {
        let package = self.packages.get_by_id(ctx, id).await?;
        Ok(pricing::quote(&package.terms()))
    }

    /// Packages of a raffle, cheapest amount first.
    pub async fn list_packages(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
    ) -> RaffleResult<Vec<TicketPackage>> {
        let raffle = self.raffles.get_by_id(ctx, raffle_id).await?;
        self.packages.list_by_raffle(ctx, raffle.id).await
    }
}
