//! Winner selection.
//!
//! A raffle has at most one winning entry. Entries are not tenant-scoped,
//! so every operation first resolves the raffle in the caller's context.

use rand::Rng;
use raffle_core::context::TenantContext;
use raffle_core::error::RaffleResult;
use raffle_core::models::raffle_entry::RaffleEntry;
use raffle_core::repository::{
    PaginatedResult, Pagination, RaffleEntryRepository, RaffleRepository,
};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::error::AdminError;

pub struct WinnerService<R, E>
where
    R: RaffleRepository,
    E: RaffleEntryRepository,
{
    raffles: R,
    entries: E,
    /// Keeps a random draw's count-then-pick from interleaving with another.
    draw: Mutex<()>,
}

impl<R, E> WinnerService<R, E>
where
    R: RaffleRepository,
    E: RaffleEntryRepository,
{
    pub fn new(raffles: R, entries: E) -> Self {
        Self {
            raffles,
            entries,
            draw: Mutex::new(()),
        }
    }

    /// Mark an entry as the winner, replacing any previous winner.
    pub async fn set_winner(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        entry_id: Uuid,
    ) -> RaffleResult<RaffleEntry> {
        let raffle = self.raffles.get_by_id(ctx, raffle_id).await?;
        let winner = self.entries.set_winner(raffle.id, entry_id).await?;
        info!(
            raffle_id = %raffle.id,
            entry_id = %winner.id,
            ticket_number = winner.ticket_number,
            "Winner set"
        );
        Ok(winner)
    }

    pub async fn remove_winner(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        entry_id: Uuid,
    ) -> RaffleResult<RaffleEntry> {
        let raffle = self.raffles.get_by_id(ctx, raffle_id).await?;
        let entry = self.entries.clear_winner(raffle.id, entry_id).await?;
        info!(raffle_id = %raffle.id, entry_id = %entry.id, "Winner removed");
        Ok(entry)
    }

    /// Pick one entry uniformly at random and make it the winner.
    pub async fn select_random_winner(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
    ) -> RaffleResult<RaffleEntry> {
        let raffle = self.raffles.get_by_id(ctx, raffle_id).await?;

        let _guard = self.draw.lock().await;

        let count = self.entries.count(raffle.id, None).await?;
        if count == 0 {
            return Err(AdminError::NoEntries(raffle.id).into());
        }
        let index = rand::thread_rng().gen_range(0..count);
        let drawn = self.entries.nth(raffle.id, index).await?;
        let winner = self.entries.set_winner(raffle.id, drawn.id).await?;

        info!(
            raffle_id = %raffle.id,
            entry_id = %winner.id,
            ticket_number = winner.ticket_number,
            entries = count,
            "Random winner selected"
        );
        Ok(winner)
    }

    pub async fn current_winner(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
    ) -> RaffleResult<Option<RaffleEntry>> {
        let raffle = self.raffles.get_by_id(ctx, raffle_id).await?;
        self.entries.get_winner(raffle.id).await
    }

    /// Sold entries of a raffle ordered by ticket number.
    pub async fn entries(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        pagination: Pagination,
    ) -> RaffleResult<PaginatedResult<RaffleEntry>> {
        let raffle = self.raffles.get_by_id(ctx, raffle_id).await?;
        self.entries.list_by_raffle(raffle.id, pagination).await
    }
}
