//! Number pool allocation, statistics and generation against an in-memory
//! database.

use raffle_admin::AdminConfig;
use raffle_admin::service::{GenerateNumbers, NumberPoolService};
use raffle_core::RaffleError;
use raffle_core::context::TenantContext;
use raffle_core::models::ambassador::CreateAmbassador;
use raffle_core::models::invoice::{CreateInvoice, Invoice};
use raffle_core::models::number_assignment::{AssignmentHolder, CreateNumberAssignment};
use raffle_core::models::participant::{CreateParticipant, Participant};
use raffle_core::models::raffle::{CreateRaffle, Raffle};
use raffle_core::models::referral::CreateReferral;
use raffle_core::models::raffle_entry::CreateRaffleEntry;
use raffle_core::ranges::NumberRange;
use raffle_core::repository::{
    AmbassadorRepository, InvoiceRepository, ParticipantRepository,
    RaffleEntryRepository, RaffleRepository, ReferralRepository,
};
use raffle_db::repository::{
    SurrealAmbassadorRepository, SurrealInvoiceRepository, SurrealNumberAssignmentRepository,
    SurrealParticipantRepository, SurrealRaffleEntryRepository, SurrealRaffleRepository,
    SurrealReferralRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Pool = NumberPoolService<
    SurrealRaffleRepository<Db>,
    SurrealNumberAssignmentRepository<Db>,
    SurrealReferralRepository<Db>,
    SurrealAmbassadorRepository<Db>,
    SurrealRaffleEntryRepository<Db>,
    SurrealParticipantRepository<Db>,
    SurrealInvoiceRepository<Db>,
>;

struct Fixture {
    db: Surreal<Db>,
    ctx: TenantContext,
    pool: Pool,
    raffle_id: Uuid,
    referral_id: Uuid,
    ambassador_id: Uuid,
    participant_id: Uuid,
}

async fn setup(total_numbers: u64) -> Fixture {
    setup_with(total_numbers, AdminConfig::default()).await
}

async fn setup_with(total_numbers: u64, config: AdminConfig) -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    raffle_db::run_migrations(&db).await.unwrap();

    let ctx = TenantContext::tenant(Uuid::new_v4());
    let raffle = create_raffle(&db, &ctx, "Summer draw", total_numbers).await;
    let participant = create_participant(&db, &ctx, "pat@example.com").await;
    let referral = SurrealReferralRepository::new(db.clone())
        .create(
            &ctx,
            CreateReferral {
                ambassador_id: None,
                name: "Rita".into(),
                email: "rita@example.com".into(),
                phone: None,
                code: "RITA".into(),
                commission_rate: 0.1,
                team_commission_rate: 0.0,
            },
        )
        .await
        .unwrap();
    let ambassador = SurrealAmbassadorRepository::new(db.clone())
        .create(
            &ctx,
            CreateAmbassador {
                name: "Alex".into(),
                email: "alex@example.com".into(),
                phone: None,
                code: "ALEX".into(),
                commission_rate: 0.1,
                team_commission_rate: 0.05,
            },
        )
        .await
        .unwrap();

    let pool = NumberPoolService::new(
        SurrealRaffleRepository::new(db.clone()),
        SurrealNumberAssignmentRepository::new(db.clone()),
        SurrealReferralRepository::new(db.clone()),
        SurrealAmbassadorRepository::new(db.clone()),
        SurrealRaffleEntryRepository::new(db.clone()),
        SurrealParticipantRepository::new(db.clone()),
        SurrealInvoiceRepository::new(db.clone()),
        config,
    );

    Fixture {
        db,
        ctx,
        pool,
        raffle_id: raffle.id,
        referral_id: referral.id,
        ambassador_id: ambassador.id,
        participant_id: participant.id,
    }
}

async fn create_raffle(
    db: &Surreal<Db>,
    ctx: &TenantContext,
    title: &str,
    total_numbers: u64,
) -> Raffle {
    SurrealRaffleRepository::new(db.clone())
        .create(
            ctx,
            CreateRaffle {
                title: title.into(),
                description: None,
                total_numbers,
                ticket_price: 5.0,
                draw_date: None,
            },
        )
        .await
        .unwrap()
}

async fn create_participant(db: &Surreal<Db>, ctx: &TenantContext, email: &str) -> Participant {
    SurrealParticipantRepository::new(db.clone())
        .create(
            ctx,
            CreateParticipant {
                name: "Pat".into(),
                email: email.into(),
                phone: None,
            },
        )
        .await
        .unwrap()
}

async fn create_invoice(
    db: &Surreal<Db>,
    ctx: &TenantContext,
    raffle_id: Uuid,
    participant_id: Uuid,
) -> Invoice {
    SurrealInvoiceRepository::new(db.clone())
        .create(
            ctx,
            CreateInvoice {
                raffle_id,
                participant_id,
                package_id: None,
                referral_id: None,
                ambassador_id: None,
                quantity: 2,
                total_price: 10.0,
                status: None,
            },
        )
        .await
        .unwrap()
}

fn generate(f: &Fixture, quantity: u64, holder: Option<AssignmentHolder>) -> GenerateNumbers {
    GenerateNumbers {
        raffle_id: f.raffle_id,
        participant_id: f.participant_id,
        quantity,
        invoice_id: None,
        holder,
    }
}

fn assign(raffle_id: Uuid, holder: AssignmentHolder, start: u64, end: u64) -> CreateNumberAssignment {
    CreateNumberAssignment {
        raffle_id,
        holder,
        range_start: start,
        range_end: end,
    }
}

#[tokio::test]
async fn overlapping_range_is_rejected_naming_the_conflict() {
    let f = setup(1000).await;
    let holder = AssignmentHolder::Referral(f.referral_id);

    let detail = f
        .pool
        .create_assignment(&f.ctx, assign(f.raffle_id, holder, 1, 100))
        .await
        .unwrap();
    assert_eq!(detail.holder_code, "RITA");
    assert_eq!(detail.holder_name, "Rita");

    let err = f
        .pool
        .create_assignment(
            &f.ctx,
            assign(f.raffle_id, AssignmentHolder::Ambassador(f.ambassador_id), 50, 150),
        )
        .await
        .unwrap_err();
    assert!(
        matches!(err, RaffleError::RangeConflict { start: 1, end: 100 }),
        "{err:?}"
    );

    f.pool
        .create_assignment(
            &f.ctx,
            assign(f.raffle_id, AssignmentHolder::Ambassador(f.ambassador_id), 101, 150),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn invalid_ranges_are_rejected() {
    let f = setup(100).await;
    let holder = AssignmentHolder::Referral(f.referral_id);

    for (start, end) in [(0, 10), (20, 10), (90, 101)] {
        let err = f
            .pool
            .create_assignment(&f.ctx, assign(f.raffle_id, holder, start, end))
            .await
            .unwrap_err();
        assert!(matches!(err, RaffleError::Validation { .. }), "{err:?}");
    }
}

#[tokio::test]
async fn unknown_holder_is_not_found() {
    let f = setup(100).await;
    let err = f
        .pool
        .create_assignment(
            &f.ctx,
            assign(f.raffle_id, AssignmentHolder::Referral(Uuid::new_v4()), 1, 10),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::NotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn released_range_can_be_reassigned() {
    let f = setup(100).await;
    let holder = AssignmentHolder::Referral(f.referral_id);

    let first = f
        .pool
        .create_assignment(&f.ctx, assign(f.raffle_id, holder, 1, 50))
        .await
        .unwrap();
    f.pool
        .release_assignment(&f.ctx, first.assignment.id)
        .await
        .unwrap();
    f.pool
        .create_assignment(&f.ctx, assign(f.raffle_id, holder, 25, 75))
        .await
        .unwrap();

    let all = f.pool.list_assignments(&f.ctx, f.raffle_id).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn assignments_are_duplicated_to_another_raffle() {
    let f = setup(100).await;
    let holder = AssignmentHolder::Referral(f.referral_id);
    f.pool
        .create_assignment(&f.ctx, assign(f.raffle_id, holder, 1, 10))
        .await
        .unwrap();
    f.pool
        .create_assignment(&f.ctx, assign(f.raffle_id, holder, 11, 20))
        .await
        .unwrap();

    let target = create_raffle(&f.db, &f.ctx, "Winter draw", 100).await;

    let copied = f
        .pool
        .duplicate_assignments(&f.ctx, f.raffle_id, target.id)
        .await
        .unwrap();
    assert_eq!(copied, 2);

    let copies = f.pool.list_assignments(&f.ctx, target.id).await.unwrap();
    assert_eq!(copies.len(), 2);
    assert!(copies.iter().all(|a| a.holder == holder));
}

#[tokio::test]
async fn stats_count_assigned_and_sold_numbers() {
    let f = setup(100).await;
    f.pool
        .create_assignment(
            &f.ctx,
            assign(f.raffle_id, AssignmentHolder::Referral(f.referral_id), 1, 30),
        )
        .await
        .unwrap();

    let entries = SurrealRaffleEntryRepository::new(f.db.clone());
    for ticket_number in [5, 40, 90] {
        entries
            .create(CreateRaffleEntry {
                raffle_id: f.raffle_id,
                participant_id: Uuid::new_v4(),
                invoice_id: None,
                ticket_number,
            })
            .await
            .unwrap();
    }

    let stats = f.pool.number_stats(&f.ctx, f.raffle_id, None).await.unwrap();
    assert_eq!(stats.total_numbers, 100);
    assert_eq!(stats.assigned, 30);
    assert_eq!(stats.unassigned, 70);
    assert_eq!(stats.sold, 3);
    assert_eq!(stats.available, 97);

    let window = f
        .pool
        .number_stats(&f.ctx, f.raffle_id, Some(NumberRange { start: 21, end: 50 }))
        .await
        .unwrap();
    assert_eq!(window.total_numbers, 30);
    assert_eq!(window.assigned, 10);
    assert_eq!(window.sold, 1);
}

#[tokio::test]
async fn generated_numbers_come_from_the_holder_and_are_unsold() {
    let f = setup(1000).await;
    let holder = AssignmentHolder::Referral(f.referral_id);
    f.pool
        .create_assignment(&f.ctx, assign(f.raffle_id, holder, 101, 120))
        .await
        .unwrap();

    let entries = SurrealRaffleEntryRepository::new(f.db.clone());
    entries
        .create(CreateRaffleEntry {
            raffle_id: f.raffle_id,
            participant_id: Uuid::new_v4(),
            invoice_id: None,
            ticket_number: 110,
        })
        .await
        .unwrap();

    let generated = f
        .pool
        .generate_numbers(&f.ctx, generate(&f, 19, Some(holder)))
        .await
        .unwrap();

    let numbers: Vec<u64> = generated.iter().map(|e| e.ticket_number).collect();
    let expected: Vec<u64> = (101..=120).filter(|&n| n != 110).collect();
    assert_eq!(numbers, expected);
    assert!(generated.iter().all(|e| e.participant_id == f.participant_id));

    let err = f
        .pool
        .generate_numbers(&f.ctx, generate(&f, 1, Some(holder)))
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::Validation { .. }), "{err:?}");
}

#[tokio::test]
async fn generation_without_holder_avoids_assigned_ranges() {
    let f = setup(50).await;
    f.pool
        .create_assignment(
            &f.ctx,
            assign(f.raffle_id, AssignmentHolder::Ambassador(f.ambassador_id), 1, 40),
        )
        .await
        .unwrap();

    let generated = f
        .pool
        .generate_numbers(&f.ctx, generate(&f, 5, None))
        .await
        .unwrap();

    assert_eq!(generated.len(), 5);
    assert!(generated.iter().all(|e| (41..=50).contains(&e.ticket_number)));

    let sold = SurrealRaffleEntryRepository::new(f.db.clone())
        .count(f.raffle_id, None)
        .await
        .unwrap();
    assert_eq!(sold, 5);
}

#[tokio::test]
async fn zero_quantity_is_rejected() {
    let f = setup(10).await;
    let err = f
        .pool
        .generate_numbers(&f.ctx, generate(&f, 0, None))
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::Validation { .. }));
}

#[tokio::test]
async fn raffles_of_other_tenants_cannot_be_allocated() {
    let f = setup(100).await;
    let other = TenantContext::tenant(Uuid::new_v4());
    let err = f
        .pool
        .create_assignment(
            &other,
            assign(f.raffle_id, AssignmentHolder::Referral(f.referral_id), 1, 10),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::NotFound { .. }));
}

#[tokio::test]
async fn duplicating_onto_the_same_raffle_is_rejected() {
    let f = setup(100).await;
    f.pool
        .create_assignment(
            &f.ctx,
            assign(f.raffle_id, AssignmentHolder::Referral(f.referral_id), 1, 50),
        )
        .await
        .unwrap();

    let err = f
        .pool
        .duplicate_assignments(&f.ctx, f.raffle_id, f.raffle_id)
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::Validation { .. }), "{err:?}");

    let all = f.pool.list_assignments(&f.ctx, f.raffle_id).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn duplicating_onto_assigned_numbers_copies_nothing() {
    let f = setup(100).await;
    let holder = AssignmentHolder::Referral(f.referral_id);
    f.pool
        .create_assignment(&f.ctx, assign(f.raffle_id, holder, 1, 10))
        .await
        .unwrap();
    f.pool
        .create_assignment(&f.ctx, assign(f.raffle_id, holder, 41, 60))
        .await
        .unwrap();

    let target = create_raffle(&f.db, &f.ctx, "Winter draw", 100).await;
    f.pool
        .create_assignment(
            &f.ctx,
            assign(target.id, AssignmentHolder::Ambassador(f.ambassador_id), 50, 55),
        )
        .await
        .unwrap();

    let err = f
        .pool
        .duplicate_assignments(&f.ctx, f.raffle_id, target.id)
        .await
        .unwrap_err();
    assert!(
        matches!(err, RaffleError::RangeConflict { start: 50, end: 55 }),
        "{err:?}"
    );

    let on_target = f.pool.list_assignments(&f.ctx, target.id).await.unwrap();
    assert_eq!(on_target.len(), 1);
    assert_eq!(on_target[0].range_start, 50);
}

#[tokio::test]
async fn duplicating_beyond_the_target_numbers_is_rejected() {
    let f = setup(100).await;
    f.pool
        .create_assignment(
            &f.ctx,
            assign(f.raffle_id, AssignmentHolder::Referral(f.referral_id), 61, 80),
        )
        .await
        .unwrap();

    let target = create_raffle(&f.db, &f.ctx, "Small draw", 70).await;
    let err = f
        .pool
        .duplicate_assignments(&f.ctx, f.raffle_id, target.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::Validation { .. }), "{err:?}");
    assert!(f.pool.list_assignments(&f.ctx, target.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn quantity_above_the_configured_maximum_is_rejected() {
    let f = setup_with(
        100,
        AdminConfig {
            max_generate_quantity: 3,
            ..AdminConfig::default()
        },
    )
    .await;

    let err = f
        .pool
        .generate_numbers(&f.ctx, generate(&f, 4, None))
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::Validation { .. }), "{err:?}");

    f.pool
        .generate_numbers(&f.ctx, generate(&f, 3, None))
        .await
        .unwrap();
}

#[tokio::test]
async fn quantity_above_the_free_numbers_is_rejected() {
    let f = setup(20).await;
    f.pool
        .create_assignment(
            &f.ctx,
            assign(f.raffle_id, AssignmentHolder::Referral(f.referral_id), 1, 15),
        )
        .await
        .unwrap();

    let err = f
        .pool
        .generate_numbers(&f.ctx, generate(&f, 6, None))
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::Validation { .. }), "{err:?}");

    let sold = SurrealRaffleEntryRepository::new(f.db.clone())
        .count(f.raffle_id, None)
        .await
        .unwrap();
    assert_eq!(sold, 0);
}

#[tokio::test]
async fn holder_with_every_number_sold_has_nothing_to_generate() {
    let f = setup(100).await;
    let holder = AssignmentHolder::Ambassador(f.ambassador_id);
    f.pool
        .create_assignment(&f.ctx, assign(f.raffle_id, holder, 10, 12))
        .await
        .unwrap();

    let entries = SurrealRaffleEntryRepository::new(f.db.clone());
    for ticket_number in 10..=12 {
        entries
            .create(CreateRaffleEntry {
                raffle_id: f.raffle_id,
                participant_id: f.participant_id,
                invoice_id: None,
                ticket_number,
            })
            .await
            .unwrap();
    }

    let err = f
        .pool
        .generate_numbers(&f.ctx, generate(&f, 1, Some(holder)))
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::Validation { .. }), "{err:?}");
}

#[tokio::test]
async fn participant_must_exist_in_the_raffle_tenant() {
    let f = setup(100).await;

    let unknown = GenerateNumbers {
        participant_id: Uuid::new_v4(),
        ..generate(&f, 2, None)
    };
    let err = f.pool.generate_numbers(&f.ctx, unknown).await.unwrap_err();
    assert!(matches!(err, RaffleError::NotFound { .. }), "{err:?}");

    let other = TenantContext::tenant(Uuid::new_v4());
    let stranger = create_participant(&f.db, &other, "stranger@example.com").await;
    let foreign = GenerateNumbers {
        participant_id: stranger.id,
        ..generate(&f, 2, None)
    };
    let err = f.pool.generate_numbers(&f.ctx, foreign.clone()).await.unwrap_err();
    assert!(matches!(err, RaffleError::NotFound { .. }), "{err:?}");

    let err = f
        .pool
        .generate_numbers(&TenantContext::admin(None), foreign)
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::NotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn invoice_must_belong_to_the_raffle_and_participant() {
    let f = setup(100).await;
    let other_raffle = create_raffle(&f.db, &f.ctx, "Winter draw", 100).await;
    let other_participant = create_participant(&f.db, &f.ctx, "sam@example.com").await;

    let unknown = GenerateNumbers {
        invoice_id: Some(Uuid::new_v4()),
        ..generate(&f, 2, None)
    };
    let err = f.pool.generate_numbers(&f.ctx, unknown).await.unwrap_err();
    assert!(matches!(err, RaffleError::NotFound { .. }), "{err:?}");

    let wrong_raffle = create_invoice(&f.db, &f.ctx, other_raffle.id, f.participant_id).await;
    let input = GenerateNumbers {
        invoice_id: Some(wrong_raffle.id),
        ..generate(&f, 2, None)
    };
    let err = f.pool.generate_numbers(&f.ctx, input).await.unwrap_err();
    assert!(matches!(err, RaffleError::Validation { .. }), "{err:?}");

    let wrong_buyer = create_invoice(&f.db, &f.ctx, f.raffle_id, other_participant.id).await;
    let input = GenerateNumbers {
        invoice_id: Some(wrong_buyer.id),
        ..generate(&f, 2, None)
    };
    let err = f.pool.generate_numbers(&f.ctx, input).await.unwrap_err();
    assert!(matches!(err, RaffleError::Validation { .. }), "{err:?}");

    let invoice = create_invoice(&f.db, &f.ctx, f.raffle_id, f.participant_id).await;
    let input = GenerateNumbers {
        invoice_id: Some(invoice.id),
        ..generate(&f, 2, None)
    };
    let generated = f.pool.generate_numbers(&f.ctx, input).await.unwrap();
    assert_eq!(generated.len(), 2);
    assert!(generated.iter().all(|e| e.invoice_id == Some(invoice.id)));
}
