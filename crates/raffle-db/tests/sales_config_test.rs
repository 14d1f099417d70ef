//! Integration tests for participants, invoices and provider configuration.

use raffle_core::RaffleError;
use raffle_core::context::TenantContext;
use raffle_core::models::email_config::{EmailProvider, UpsertEmailConfig};
use raffle_core::models::invoice::{CreateInvoice, InvoiceStatus};
use raffle_core::models::participant::CreateParticipant;
use raffle_core::models::payment_config::{PaymentProvider, UpsertPaymentConfig};
use raffle_core::repository::{
    EmailConfigRepository, InvoiceRepository, Pagination, ParticipantRepository,
    PaymentConfigRepository,
};
use raffle_db::repository::{
    SurrealEmailConfigRepository, SurrealInvoiceRepository, SurrealParticipantRepository,
    SurrealPaymentConfigRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    raffle_db::run_migrations(&db).await.unwrap();
    db
}

fn invoice(raffle_id: Uuid, referral_id: Option<Uuid>, ambassador_id: Option<Uuid>) -> CreateInvoice {
    CreateInvoice {
        raffle_id,
        participant_id: Uuid::new_v4(),
        package_id: None,
        referral_id,
        ambassador_id,
        quantity: 2,
        total_price: 20.0,
        status: None,
    }
}

#[tokio::test]
async fn participant_email_is_unique_per_tenant() {
    let db = setup().await;
    let repo = SurrealParticipantRepository::new(db);
    let ctx = TenantContext::tenant(Uuid::new_v4());

    let input = CreateParticipant {
        name: "Pat".into(),
        email: "pat@example.com".into(),
        phone: None,
    };
    let created = repo.create(&ctx, input.clone()).await.unwrap();
    let fetched = repo.get_by_email(&ctx, "pat@example.com").await.unwrap();
    assert_eq!(fetched.id, created.id);

    let err = repo.create(&ctx, input.clone()).await.unwrap_err();
    assert!(matches!(err, RaffleError::AlreadyExists { .. }), "{err:?}");

    let other = TenantContext::tenant(Uuid::new_v4());
    repo.create(&other, input).await.unwrap();
    assert_eq!(repo.list(&ctx, Pagination::default()).await.unwrap().total, 1);
}

#[tokio::test]
async fn invoices_default_to_pending_and_change_status() {
    let db = setup().await;
    let repo = SurrealInvoiceRepository::new(db);
    let ctx = TenantContext::tenant(Uuid::new_v4());
    let raffle_id = Uuid::new_v4();

    let created = repo.create(&ctx, invoice(raffle_id, None, None)).await.unwrap();
    assert_eq!(created.status, InvoiceStatus::Pending);

    let paid = repo
        .update_status(&ctx, created.id, InvoiceStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);

    let page = repo
        .list_by_raffle(&ctx, raffle_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn invoices_are_found_by_seller() {
    let db = setup().await;
    let repo = SurrealInvoiceRepository::new(db);
    let ctx = TenantContext::tenant(Uuid::new_v4());
    let raffle_id = Uuid::new_v4();
    let ambassador_id = Uuid::new_v4();
    let (r1, r2, r3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    repo.create(&ctx, invoice(raffle_id, None, Some(ambassador_id)))
        .await
        .unwrap();
    repo.create(&ctx, invoice(raffle_id, Some(r1), None)).await.unwrap();
    repo.create(&ctx, invoice(raffle_id, Some(r2), None)).await.unwrap();
    repo.create(&ctx, invoice(raffle_id, Some(r3), None)).await.unwrap();

    let direct = repo.list_by_ambassador(&ctx, ambassador_id).await.unwrap();
    assert_eq!(direct.len(), 1);

    let team = repo.list_by_referrals(&ctx, &[r1, r2]).await.unwrap();
    assert_eq!(team.len(), 2);
    assert!(team.iter().all(|i| i.referral_id != Some(r3)));

    assert!(repo.list_by_referrals(&ctx, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn payment_config_upsert_replaces_by_provider() {
    let db = setup().await;
    let repo = SurrealPaymentConfigRepository::new(db);
    let ctx = TenantContext::tenant(Uuid::new_v4());

    let first = repo
        .upsert(
            &ctx,
            UpsertPaymentConfig {
                provider: PaymentProvider::Stripe,
                public_key: Some("pk_old".into()),
                secret_key: None,
                sandbox: true,
            },
        )
        .await
        .unwrap();
    assert!(!first.is_active);

    let second = repo
        .upsert(
            &ctx,
            UpsertPaymentConfig {
                provider: PaymentProvider::Stripe,
                public_key: Some("pk_new".into()),
                secret_key: Some("sk".into()),
                sandbox: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.public_key.as_deref(), Some("pk_new"));
    assert!(!second.sandbox);
    assert_eq!(repo.list(&ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn activating_a_payment_config_deactivates_siblings() {
    let db = setup().await;
    let repo = SurrealPaymentConfigRepository::new(db);
    let ctx = TenantContext::tenant(Uuid::new_v4());

    let mut ids = Vec::new();
    for provider in [PaymentProvider::Stripe, PaymentProvider::PayPal] {
        let config = repo
            .upsert(
                &ctx,
                UpsertPaymentConfig {
                    provider,
                    public_key: None,
                    secret_key: None,
                    sandbox: true,
                },
            )
            .await
            .unwrap();
        ids.push(config.id);
    }

    assert!(repo.get_active(&ctx).await.unwrap().is_none());

    repo.activate(&ctx, ids[0]).await.unwrap();
    repo.activate(&ctx, ids[1]).await.unwrap();

    let active = repo.get_active(&ctx).await.unwrap().unwrap();
    assert_eq!(active.provider, PaymentProvider::PayPal);
    let stripe = repo
        .get_by_provider(&ctx, PaymentProvider::Stripe)
        .await
        .unwrap();
    assert!(!stripe.is_active);
}

#[tokio::test]
async fn email_config_lifecycle() {
    let db = setup().await;
    let repo = SurrealEmailConfigRepository::new(db);
    let ctx = TenantContext::tenant(Uuid::new_v4());

    let config = repo
        .upsert(
            &ctx,
            UpsertEmailConfig {
                provider: EmailProvider::SendGrid,
                from_email: "noreply@example.com".into(),
                from_name: "Raffles".into(),
                api_key: Some("key".into()),
            },
        )
        .await
        .unwrap();

    let active = repo.activate(&ctx, config.id).await.unwrap();
    assert!(active.is_active);
    assert_eq!(
        repo.get_active(&ctx).await.unwrap().map(|c| c.id),
        Some(config.id)
    );

    let other = TenantContext::tenant(Uuid::new_v4());
    assert!(repo.get_active(&other).await.unwrap().is_none());
    assert!(matches!(
        repo.get_by_provider(&other, EmailProvider::SendGrid)
            .await
            .unwrap_err(),
        RaffleError::NotFound { .. }
    ));

    repo.delete(&ctx, config.id).await.unwrap();
    assert!(repo.list(&ctx).await.unwrap().is_empty());
}
