//! Integration tests for number assignments and raffle entries.

use raffle_core::RaffleError;
use raffle_core::context::TenantContext;
use raffle_core::models::number_assignment::{
    AssignmentHolder, AssignmentStatus, CreateNumberAssignment,
};
use raffle_core::models::raffle_entry::CreateRaffleEntry;
use raffle_core::ranges::NumberRange;
use raffle_core::repository::{NumberAssignmentRepository, Pagination, RaffleEntryRepository};
use raffle_db::repository::{SurrealNumberAssignmentRepository, SurrealRaffleEntryRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    raffle_db::run_migrations(&db).await.unwrap();
    db
}

fn assignment(raffle_id: Uuid, holder: AssignmentHolder, start: u64, end: u64) -> CreateNumberAssignment {
    CreateNumberAssignment {
        raffle_id,
        holder,
        range_start: start,
        range_end: end,
    }
}

#[tokio::test]
async fn overlapping_ranges_are_found_in_start_order() {
    let db = setup().await;
    let repo = SurrealNumberAssignmentRepository::new(db);
    let ctx = TenantContext::tenant(Uuid::new_v4());
    let raffle_id = Uuid::new_v4();
    let holder = AssignmentHolder::Referral(Uuid::new_v4());

    repo.create(&ctx, assignment(raffle_id, holder, 201, 300))
        .await
        .unwrap();
    repo.create(&ctx, assignment(raffle_id, holder, 1, 100))
        .await
        .unwrap();
    repo.create(&ctx, assignment(raffle_id, holder, 500, 600))
        .await
        .unwrap();

    let hits = repo
        .find_overlapping(&ctx, raffle_id, NumberRange { start: 50, end: 250 })
        .await
        .unwrap();
    let starts: Vec<u64> = hits.iter().map(|a| a.range_start).collect();
    assert_eq!(starts, vec![1, 201]);

    // Touching endpoints overlap: ranges are inclusive.
    let edge = repo
        .find_overlapping(&ctx, raffle_id, NumberRange { start: 100, end: 100 })
        .await
        .unwrap();
    assert_eq!(edge.len(), 1);

    let gap = repo
        .find_overlapping(&ctx, raffle_id, NumberRange { start: 101, end: 200 })
        .await
        .unwrap();
    assert!(gap.is_empty());
}

#[tokio::test]
async fn released_ranges_no_longer_conflict() {
    let db = setup().await;
    let repo = SurrealNumberAssignmentRepository::new(db);
    let ctx = TenantContext::tenant(Uuid::new_v4());
    let raffle_id = Uuid::new_v4();
    let holder = AssignmentHolder::Ambassador(Uuid::new_v4());

    let created = repo
        .create(&ctx, assignment(raffle_id, holder, 10, 20))
        .await
        .unwrap();
    assert_eq!(created.status, AssignmentStatus::Assigned);
    assert_eq!(created.holder, holder);

    let released = repo
        .set_status(&ctx, created.id, AssignmentStatus::Released)
        .await
        .unwrap();
    assert!(!released.is_active());

    let hits = repo
        .find_overlapping(&ctx, raffle_id, NumberRange { start: 1, end: 100 })
        .await
        .unwrap();
    assert!(hits.is_empty());

    let all = repo.list_by_raffle(&ctx, raffle_id, None).await.unwrap();
    assert_eq!(all.len(), 1);
    let active = repo
        .list_by_raffle(&ctx, raffle_id, Some(AssignmentStatus::Assigned))
        .await
        .unwrap();
    assert!(active.is_empty());
}

#[tokio::test]
async fn holder_ranges_distinguish_holder_kind() {
    let db = setup().await;
    let repo = SurrealNumberAssignmentRepository::new(db);
    let ctx = TenantContext::tenant(Uuid::new_v4());
    let raffle_id = Uuid::new_v4();
    let shared_id = Uuid::new_v4();

    repo.create(&ctx, assignment(raffle_id, AssignmentHolder::Referral(shared_id), 1, 10))
        .await
        .unwrap();
    repo.create(&ctx, assignment(raffle_id, AssignmentHolder::Ambassador(shared_id), 11, 20))
        .await
        .unwrap();

    let held = repo
        .list_by_holder(&ctx, raffle_id, AssignmentHolder::Ambassador(shared_id))
        .await
        .unwrap();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].range(), NumberRange { start: 11, end: 20 });
}

#[tokio::test]
async fn assignments_are_tenant_scoped() {
    let db = setup().await;
    let repo = SurrealNumberAssignmentRepository::new(db);
    let owner = TenantContext::tenant(Uuid::new_v4());
    let other = TenantContext::tenant(Uuid::new_v4());
    let raffle_id = Uuid::new_v4();

    let created = repo
        .create(
            &owner,
            assignment(raffle_id, AssignmentHolder::Referral(Uuid::new_v4()), 1, 5),
        )
        .await
        .unwrap();

    assert!(matches!(
        repo.get_by_id(&other, created.id).await.unwrap_err(),
        RaffleError::NotFound { .. }
    ));
    assert!(
        repo.find_overlapping(&other, raffle_id, NumberRange { start: 1, end: 5 })
            .await
            .unwrap()
            .is_empty()
    );

    repo.delete(&owner, created.id).await.unwrap();
    assert!(matches!(
        repo.get_by_id(&owner, created.id).await.unwrap_err(),
        RaffleError::NotFound { .. }
    ));
}

// -----------------------------------------------------------------------
// Raffle entries
// -----------------------------------------------------------------------

async fn seed_entries(repo: &SurrealRaffleEntryRepository<Db>, raffle_id: Uuid, numbers: &[u64]) {
    let participant_id = Uuid::new_v4();
    for &ticket_number in numbers {
        repo.create(CreateRaffleEntry {
            raffle_id,
            participant_id,
            invoice_id: None,
            ticket_number,
        })
        .await
        .unwrap();
    }
}

#[tokio::test]
async fn ticket_numbers_are_unique_per_raffle() {
    let db = setup().await;
    let repo = SurrealRaffleEntryRepository::new(db);
    let raffle_id = Uuid::new_v4();

    seed_entries(&repo, raffle_id, &[7]).await;
    let err = repo
        .create(CreateRaffleEntry {
            raffle_id,
            participant_id: Uuid::new_v4(),
            invoice_id: None,
            ticket_number: 7,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::AlreadyExists { .. }), "{err:?}");

    // The same number in another raffle is fine.
    seed_entries(&repo, Uuid::new_v4(), &[7]).await;
}

#[tokio::test]
async fn entries_are_ordered_and_counted() {
    let db = setup().await;
    let repo = SurrealRaffleEntryRepository::new(db);
    let raffle_id = Uuid::new_v4();

    seed_entries(&repo, raffle_id, &[42, 3, 17, 99]).await;

    assert_eq!(repo.ticket_numbers(raffle_id).await.unwrap(), vec![3, 17, 42, 99]);
    assert_eq!(repo.count(raffle_id, None).await.unwrap(), 4);
    assert_eq!(
        repo.count(raffle_id, Some(NumberRange { start: 10, end: 50 }))
            .await
            .unwrap(),
        2
    );

    assert_eq!(repo.nth(raffle_id, 0).await.unwrap().ticket_number, 3);
    assert_eq!(repo.nth(raffle_id, 3).await.unwrap().ticket_number, 99);
    assert!(matches!(
        repo.nth(raffle_id, 4).await.unwrap_err(),
        RaffleError::NotFound { .. }
    ));

    let page = repo
        .list_by_raffle(
            raffle_id,
            Pagination {
                offset: 1,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    let numbers: Vec<u64> = page.items.iter().map(|e| e.ticket_number).collect();
    assert_eq!(numbers, vec![17, 42]);
}

#[tokio::test]
async fn setting_a_winner_clears_the_previous_one() {
    let db = setup().await;
    let repo = SurrealRaffleEntryRepository::new(db);
    let raffle_id = Uuid::new_v4();

    seed_entries(&repo, raffle_id, &[1, 2, 3]).await;
    let first = repo.nth(raffle_id, 0).await.unwrap();
    let second = repo.nth(raffle_id, 1).await.unwrap();

    assert!(repo.get_winner(raffle_id).await.unwrap().is_none());

    repo.set_winner(raffle_id, first.id).await.unwrap();
    let winner = repo.set_winner(raffle_id, second.id).await.unwrap();
    assert!(winner.is_winner);

    let current = repo.get_winner(raffle_id).await.unwrap().unwrap();
    assert_eq!(current.id, second.id);
    assert!(!repo.get_by_id(raffle_id, first.id).await.unwrap().is_winner);

    let cleared = repo.clear_winner(raffle_id, second.id).await.unwrap();
    assert!(!cleared.is_winner);
    assert!(repo.get_winner(raffle_id).await.unwrap().is_none());
}

#[tokio::test]
async fn entry_of_another_raffle_is_not_found() {
    let db = setup().await;
    let repo = SurrealRaffleEntryRepository::new(db);
    let raffle_id = Uuid::new_v4();

    seed_entries(&repo, raffle_id, &[5]).await;
    let entry = repo.nth(raffle_id, 0).await.unwrap();

    let err = repo.set_winner(Uuid::new_v4(), entry.id).await.unwrap_err();
    assert!(matches!(err, RaffleError::NotFound { .. }));
}
