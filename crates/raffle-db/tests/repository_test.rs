//! Integration tests for the Tenant, Raffle and TicketPackage repository
//! implementations using in-memory SurrealDB.

use raffle_core::RaffleError;
use raffle_core::context::TenantContext;
use raffle_core::models::raffle::{CreateRaffle, RaffleStatus, UpdateRaffle};
use raffle_core::models::tenant::{CreateTenant, TenantPlan, TenantStatus, UpdateTenant};
use raffle_core::models::ticket_package::{CreateTicketPackage, PromotionType, UpdateTicketPackage};
use raffle_core::repository::{
    Pagination, RaffleRepository, TenantRepository, TicketPackageRepository,
};
use raffle_db::repository::{
    SurrealRaffleRepository, SurrealTenantRepository, SurrealTicketPackageRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    raffle_db::run_migrations(&db).await.unwrap();
    db
}

fn tenant_input(slug: &str) -> CreateTenant {
    CreateTenant {
        slug: slug.into(),
        name: format!("{slug} inc"),
        plan: None,
        metadata: None,
    }
}

fn raffle_input(title: &str, total_numbers: u64) -> CreateRaffle {
    CreateRaffle {
        title: title.into(),
        description: None,
        total_numbers,
        ticket_price: 5.0,
        draw_date: None,
    }
}

// -----------------------------------------------------------------------
// Tenant tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_tenant() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(tenant_input("acme")).await.unwrap();
    assert_eq!(tenant.slug, "acme");
    assert_eq!(tenant.status, TenantStatus::Active);
    assert_eq!(tenant.plan, TenantPlan::Basic);

    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched.id, tenant.id);
    assert_eq!(fetched.name, "acme inc");

    let by_slug = repo.get_by_slug("acme").await.unwrap();
    assert_eq!(by_slug.id, tenant.id);
}

#[tokio::test]
async fn duplicate_tenant_slug_is_rejected() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    repo.create(tenant_input("taken")).await.unwrap();
    let err = repo.create(tenant_input("taken")).await.unwrap_err();
    assert!(matches!(err, RaffleError::AlreadyExists { .. }), "{err:?}");
}

#[tokio::test]
async fn update_tenant_changes_only_given_fields() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(tenant_input("before")).await.unwrap();
    let updated = repo
        .update(
            tenant.id,
            UpdateTenant {
                plan: Some(TenantPlan::Pro),
                status: Some(TenantStatus::Suspended),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.slug, "before");
    assert_eq!(updated.plan, TenantPlan::Pro);
    assert_eq!(updated.status, TenantStatus::Suspended);
    assert!(updated.updated_at >= tenant.updated_at);
}

#[tokio::test]
async fn delete_tenant_is_soft() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(tenant_input("gone")).await.unwrap();
    repo.delete(tenant.id).await.unwrap();

    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched.status, TenantStatus::Deleted);
}

#[tokio::test]
async fn list_tenants_paginates() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    for i in 0..5 {
        repo.create(tenant_input(&format!("t{i}"))).await.unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 0,
            limit: 2,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);

    let last = repo
        .list(Pagination {
            offset: 4,
            limit: 2,
        })
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
}

#[tokio::test]
async fn missing_tenant_is_not_found() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let err = repo.get_by_id(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, RaffleError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Raffle tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_raffle_starts_as_draft() {
    let db = setup().await;
    let tenants = SurrealTenantRepository::new(db.clone());
    let raffles = SurrealRaffleRepository::new(db);

    let tenant = tenants.create(tenant_input("draws")).await.unwrap();
    let ctx = TenantContext::tenant(tenant.id);

    let raffle = raffles
        .create(&ctx, raffle_input("Summer", 1000))
        .await
        .unwrap();
    assert_eq!(raffle.status, RaffleStatus::Draft);
    assert_eq!(raffle.tenant_id, tenant.id);
    assert_eq!(raffle.total_numbers, 1000);
    assert_eq!(raffle.description, "");

    let updated = raffles
        .update(
            &ctx,
            raffle.id,
            UpdateRaffle {
                status: Some(RaffleStatus::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, RaffleStatus::Active);
    assert_eq!(updated.title, "Summer");
}

#[tokio::test]
async fn delete_raffle_removes_it() {
    let db = setup().await;
    let raffles = SurrealRaffleRepository::new(db);
    let ctx = TenantContext::tenant(uuid::Uuid::new_v4());

    let raffle = raffles.create(&ctx, raffle_input("Once", 10)).await.unwrap();
    raffles.delete(&ctx, raffle.id).await.unwrap();

    let err = raffles.get_by_id(&ctx, raffle.id).await.unwrap_err();
    assert!(matches!(err, RaffleError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Ticket package tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn packages_are_listed_by_amount() {
    let db = setup().await;
    let raffles = SurrealRaffleRepository::new(db.clone());
    let packages = SurrealTicketPackageRepository::new(db);
    let ctx = TenantContext::tenant(uuid::Uuid::new_v4());

    let raffle = raffles.create(&ctx, raffle_input("Pkgs", 500)).await.unwrap();

    for (name, amount, promotion_type) in [
        ("ten", 10, PromotionType::Discount),
        ("two", 2, PromotionType::TwoForOne),
        ("five", 5, PromotionType::ThreeForTwo),
    ] {
        packages
            .create(
                &ctx,
                CreateTicketPackage {
                    raffle_id: raffle.id,
                    name: name.into(),
                    amount,
                    base_price: 10.0,
                    promotion_type,
                    promotion_value: 10.0,
                },
            )
            .await
            .unwrap();
    }

    let listed = packages.list_by_raffle(&ctx, raffle.id).await.unwrap();
    let amounts: Vec<u32> = listed.iter().map(|p| p.amount).collect();
    assert_eq!(amounts, vec![2, 5, 10]);
    assert_eq!(listed[0].promotion_type, PromotionType::TwoForOne);
    assert_eq!(listed[1].promotion_type, PromotionType::ThreeForTwo);

    let updated = packages
        .update(
            &ctx,
            listed[0].id,
            UpdateTicketPackage {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.is_active);
    assert_eq!(updated.total_tickets(), 4);
}
