//! Number pools: non-overlapping range allocations of raffle numbers to
//! referrals and ambassadors, pool statistics and random number generation.

use rand::Rng;
use raffle_core::context::TenantContext;
use raffle_core::error::{RaffleError, RaffleResult};
use raffle_core::models::number_assignment::{
    AssignmentDetail, AssignmentHolder, AssignmentStatus, CreateNumberAssignment,
    NumberAssignment,
};
use raffle_core::models::raffle::Raffle;
use raffle_core::models::raffle_entry::{CreateRaffleEntry, RaffleEntry};
use raffle_core::ranges::{self, NumberRange};
use raffle_core::repository::{
    AmbassadorRepository, InvoiceRepository, NumberAssignmentRepository, ParticipantRepository,
    RaffleEntryRepository, RaffleRepository, ReferralRepository,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::error::AdminError;
use crate::service::within_tenant;

/// Occupancy of a raffle's numbers over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberStats {
    pub window: NumberRange,
    /// Size of the window.
    pub total_numbers: u64,
    /// Numbers covered by assigned ranges.
    pub assigned: u64,
    /// Numbers not covered by any assigned range.
    pub unassigned: u64,
    /// Numbers already sold as entries.
    pub sold: u64,
    /// Numbers not sold yet.
    pub available: u64,
}

/// Input for [`NumberPoolService::generate_numbers`].
#[derive(Debug, Clone)]
pub struct GenerateNumbers {
    pub raffle_id: Uuid,
    pub participant_id: Uuid,
    pub quantity: u64,
    pub invoice_id: Option<Uuid>,
    /// Draw from this holder's ranges; `None` draws from unassigned numbers.
    pub holder: Option<AssignmentHolder>,
}

/// Number pool service.
///
/// Allocation and generation are read-then-write sequences; both run under
/// one async lock so concurrent callers in this process cannot interleave
/// between the availability check and the insert.
pub struct NumberPoolService<R, A, Rf, Am, E, P, I>
where
    R: RaffleRepository,
    A: NumberAssignmentRepository,
    Rf: ReferralRepository,
    Am: AmbassadorRepository,
    E: RaffleEntryRepository,
    P: ParticipantRepository,
    I: InvoiceRepository,
{
    raffles: R,
    assignments: A,
    referrals: Rf,
    ambassadors: Am,
    entries: E,
    participants: P,
    invoices: I,
    config: AdminConfig,
    allocation: Mutex<()>,
}

impl<R, A, Rf, Am, E, P, I> NumberPoolService<R, A, Rf, Am, E, P, I>
where
    R: RaffleRepository,
    A: NumberAssignmentRepository,
    Rf: ReferralRepository,
    Am: AmbassadorRepository,
    E: RaffleEntryRepository,
    P: ParticipantRepository,
    I: InvoiceRepository,
{
    pub fn new(
        raffles: R,
        assignments: A,
        referrals: Rf,
        ambassadors: Am,
        entries: E,
        participants: P,
        invoices: I,
        config: AdminConfig,
    ) -> Self {
        Self {
            raffles,
            assignments,
            referrals,
            ambassadors,
            entries,
            participants,
            invoices,
            config,
            allocation: Mutex::new(()),
        }
    }

    /// Name and code of a holder, which must exist in the context's tenant.
    async fn holder_details(
        &self,
        ctx: &TenantContext,
        holder: AssignmentHolder,
    ) -> RaffleResult<(String, String)> {
        match holder {
            AssignmentHolder::Referral(id) => {
                let referral = self.referrals.get_by_id(ctx, id).await?;
                Ok((referral.name, referral.code))
            }
            AssignmentHolder::Ambassador(id) => {
                let ambassador = self.ambassadors.get_by_id(ctx, id).await?;
                Ok((ambassador.name, ambassador.code))
            }
        }
    }

    async fn active_ranges(&self, ctx: &TenantContext, raffle_id: Uuid) -> RaffleResult<Vec<NumberRange>> {
        Ok(self
            .assignments
            .list_by_raffle(ctx, raffle_id, Some(AssignmentStatus::Assigned))
            .await?
            .iter()
            .map(NumberAssignment::range)
            .collect())
    }

    /// Assign `[range_start, range_end]` of a raffle to a holder.
    ///
    /// Fails with [`RaffleError::RangeConflict`] naming the assigned range
    /// with the lowest start that intersects the request.
    pub async fn create_assignment(
        &self,
        ctx: &TenantContext,
        input: CreateNumberAssignment,
    ) -> RaffleResult<AssignmentDetail> {
        let range = NumberRange::new(input.range_start, input.range_end)?;
        let raffle = self.raffles.get_by_id(ctx, input.raffle_id).await?;
        if range.end > raffle.total_numbers {
            return Err(AdminError::RangeOutOfBounds {
                end: range.end,
                total: raffle.total_numbers,
            }
            .into());
        }
        let (holder_name, holder_code) = self.holder_details(ctx, input.holder).await?;

        let _guard = self.allocation.lock().await;

        let existing = self
            .assignments
            .find_overlapping(ctx, raffle.id, range)
            .await?;
        if let Some(conflict) = ranges::first_conflict(&range, existing.iter().map(NumberAssignment::range)) {
            warn!(
                raffle_id = %raffle.id,
                requested = %range,
                conflict = %conflict,
                "Rejected overlapping number assignment"
            );
            return Err(RaffleError::RangeConflict {
                start: conflict.start,
                end: conflict.end,
            });
        }

        let assignment = self.assignments.create(ctx, input).await?;
        info!(
            raffle_id = %raffle.id,
            assignment_id = %assignment.id,
            holder = %assignment.holder,
            range = %range,
            "Number range assigned"
        );

        Ok(AssignmentDetail {
            assignment,
            holder_name,
            holder_code,
        })
    }

    /// Copy every assigned range of `source_raffle_id` onto `target_raffle_id`,
    /// keeping holders. Returns the number of ranges copied.
    ///
    /// Every copy is checked against the target's bounds and its assigned
    /// ranges before the first insert, so a rejected copy leaves the target
    /// untouched.
    pub async fn duplicate_assignments(
        &self,
        ctx: &TenantContext,
        source_raffle_id: Uuid,
        target_raffle_id: Uuid,
    ) -> RaffleResult<u64> {
        if source_raffle_id == target_raffle_id {
            return Err(RaffleError::validation(
                "cannot duplicate a raffle's assignments onto itself",
            ));
        }
        let source = self.raffles.get_by_id(ctx, source_raffle_id).await?;
        let target = self.raffles.get_by_id(ctx, target_raffle_id).await?;
        if source.tenant_id != target.tenant_id {
            return Err(RaffleError::validation(
                "source and target raffles belong to different tenants",
            ));
        }

        let _guard = self.allocation.lock().await;

        let assigned = self
            .assignments
            .list_by_raffle(ctx, source.id, Some(AssignmentStatus::Assigned))
            .await?;

        for assignment in &assigned {
            let range = assignment.range();
            if range.end > target.total_numbers {
                return Err(AdminError::RangeOutOfBounds {
                    end: range.end,
                    total: target.total_numbers,
                }
                .into());
            }
            let existing = self
                .assignments
                .find_overlapping(ctx, target.id, range)
                .await?;
            if let Some(conflict) = ranges::first_conflict(&range, existing.iter().map(NumberAssignment::range)) {
                warn!(
                    source = %source.id,
                    target = %target.id,
                    requested = %range,
                    conflict = %conflict,
                    "Rejected duplication onto assigned range"
                );
                return Err(RaffleError::RangeConflict {
                    start: conflict.start,
                    end: conflict.end,
                });
            }
        }

        let mut copied = 0;
        for assignment in assigned {
            self.assignments
                .create(
                    ctx,
                    CreateNumberAssignment {
                        raffle_id: target.id,
                        holder: assignment.holder,
                        range_start: assignment.range_start,
                        range_end: assignment.range_end,
                    },
                )
                .await?;
            copied += 1;
        }

        info!(
            source = %source.id,
            target = %target.id,
            copied,
            "Number assignments duplicated"
        );
        Ok(copied)
    }

    /// Return a range to the pool. The row is kept with status `Released`.
    pub async fn release_assignment(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<NumberAssignment> {
        let released = self
            .assignments
            .set_status(ctx, id, AssignmentStatus::Released)
            .await?;
        info!(assignment_id = %id, range = %released.range(), "Number range released");
        Ok(released)
    }

    /// Every assignment of a raffle, released ones included, by range start.
    pub async fn list_assignments(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
    ) -> RaffleResult<Vec<NumberAssignment>> {
        let raffle = self.raffles.get_by_id(ctx, raffle_id).await?;
        self.assignments.list_by_raffle(ctx, raffle.id, None).await
    }

    pub async fn delete_assignment(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        self.assignments.delete(ctx, id).await?;
        info!(assignment_id = %id, "Number assignment deleted");
        Ok(())
    }

    /// Assigned, sold and available counts over `[1, total_numbers]` or
    /// the part of `range` inside it.
    pub async fn number_stats(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        range: Option<NumberRange>,
    ) -> RaffleResult<NumberStats> {
        let raffle = self.raffles.get_by_id(ctx, raffle_id).await?;
        let window = stats_window(&raffle, range)?;

        let assigned = ranges::covered_count(self.active_ranges(ctx, raffle.id).await?, &window);
        let sold = self.entries.count(raffle.id, Some(window)).await?;
        let total_numbers = window.count();

        Ok(NumberStats {
            window,
            total_numbers,
            assigned,
            unassigned: total_numbers - assigned,
            sold,
            available: total_numbers.saturating_sub(sold),
        })
    }

    /// Draw `quantity` distinct unsold numbers uniformly at random and
    /// record one entry per number. Entries are returned by ticket number.
    pub async fn generate_numbers(
        &self,
        ctx: &TenantContext,
        input: GenerateNumbers,
    ) -> RaffleResult<Vec<RaffleEntry>> {
        if input.quantity == 0 {
            return Err(RaffleError::validation("quantity must be at least 1"));
        }
        if input.quantity > self.config.max_generate_quantity {
            return Err(AdminError::QuantityTooLarge {
                requested: input.quantity,
                max: self.config.max_generate_quantity,
            }
            .into());
        }

        let raffle = self.raffles.get_by_id(ctx, input.raffle_id).await?;
        let scoped = within_tenant(ctx, raffle.tenant_id);
        let participant = self.participants.get_by_id(&scoped, input.participant_id).await?;
        if let Some(invoice_id) = input.invoice_id {
            let invoice = self.invoices.get_by_id(&scoped, invoice_id).await?;
            if invoice.raffle_id != raffle.id {
                return Err(RaffleError::validation(format!(
                    "invoice {invoice_id} belongs to another raffle"
                )));
            }
            if invoice.participant_id != participant.id {
                return Err(RaffleError::validation(format!(
                    "invoice {invoice_id} belongs to another participant"
                )));
            }
        }
        let all = NumberRange {
            start: 1,
            end: raffle.total_numbers,
        };

        let _guard = self.allocation.lock().await;

        let candidates = match input.holder {
            Some(holder) => {
                self.holder_details(&scoped, holder).await?;
                let held = self
                    .assignments
                    .list_by_holder(&scoped, raffle.id, holder)
                    .await?;
                ranges::merge(held.iter().map(NumberAssignment::range))
                    .iter()
                    .filter_map(|r| r.intersection(&all))
                    .collect::<Vec<_>>()
            }
            None => ranges::complement(self.active_ranges(&scoped, raffle.id).await?, &all),
        };

        let sold = ranges::merge(
            self.entries
                .ticket_numbers(raffle.id)
                .await?
                .into_iter()
                .map(|n| NumberRange { start: n, end: n }),
        );
        let free = free_ranges(&candidates, &sold);
        let available: u64 = free.iter().map(NumberRange::count).sum();
        if available < input.quantity {
            return Err(AdminError::InsufficientNumbers {
                requested: input.quantity,
                available,
            }
            .into());
        }

        let numbers = {
            let mut rng = rand::thread_rng();
            pick_numbers(&mut rng, &free, input.quantity)?
        };

        let mut entries = Vec::with_capacity(numbers.len());
        for ticket_number in numbers {
            let entry = self
                .entries
                .create(CreateRaffleEntry {
                    raffle_id: raffle.id,
                    participant_id: participant.id,
                    invoice_id: input.invoice_id,
                    ticket_number,
                })
                .await?;
            entries.push(entry);
        }

        info!(
            raffle_id = %raffle.id,
            participant_id = %participant.id,
            quantity = entries.len(),
            "Raffle numbers generated"
        );
        Ok(entries)
    }
}

fn stats_window(raffle: &Raffle, range: Option<NumberRange>) -> RaffleResult<NumberRange> {
    let all = NumberRange {
        start: 1,
        end: raffle.total_numbers,
    };
    match range {
        None => Ok(all),
        Some(r) => r.intersection(&all).ok_or_else(|| {
            RaffleError::validation(format!("range {r} lies outside the raffle's numbers {all}"))
        }),
    }
}

/// Parts of `candidates` not covered by `sold` (merged, ascending).
fn free_ranges(candidates: &[NumberRange], sold: &[NumberRange]) -> Vec<NumberRange> {
    candidates
        .iter()
        .flat_map(|window| ranges::complement(sold.iter().copied(), window))
        .collect()
}

/// `quantity` distinct numbers drawn uniformly from the union of `free`,
/// sorted ascending. `free` must be disjoint.
fn pick_numbers<G: Rng + ?Sized>(rng: &mut G, free: &[NumberRange], quantity: u64) -> RaffleResult<Vec<u64>> {
    let total: u64 = free.iter().map(NumberRange::count).sum();
    let (Ok(length), Ok(amount)) = (usize::try_from(total), usize::try_from(quantity)) else {
        return Err(RaffleError::Internal("number pool too large to sample".into()));
    };
    if amount > length {
        return Err(AdminError::InsufficientNumbers {
            requested: quantity,
            available: total,
        }
        .into());
    }

    let mut picked: Vec<u64> = rand::seq::index::sample(rng, length, amount)
        .into_iter()
        .filter_map(|index| nth_free(free, index as u64))
        .collect();
    picked.sort_unstable();
    Ok(picked)
}

/// The number at `index` when the ranges are laid end to end.
fn nth_free(free: &[NumberRange], mut index: u64) -> Option<u64> {
    for range in free {
        let count = range.count();
        if index < count {
            return Some(range.start + index);
        }
        index -= count;
    }
    None
}
