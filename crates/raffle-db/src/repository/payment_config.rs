//! SurrealDB implementation of [`PaymentConfigRepository`].

use chrono::{DateTime, Utc};
use raffle_core::context::TenantContext;
use raffle_core::error::{RaffleError, RaffleResult};
use raffle_core::models::payment_config::{PaymentConfig, PaymentProvider, UpsertPaymentConfig};
use raffle_core::repository::PaymentConfigRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{RECORD_FIELDS, first_or_not_found, parse_uuid};
use crate::scope::TenantFilter;

#[derive(Debug, SurrealValue)]
struct PaymentConfigRow {
    record_id: String,
    tenant_id: String,
    provider: String,
    public_key: Option<String>,
    secret_key: Option<String>,
    sandbox: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_provider(s: &str) -> Result<PaymentProvider, DbError> {
    match s {
        "Stripe" => Ok(PaymentProvider::Stripe),
        "PayPal" => Ok(PaymentProvider::PayPal),
        "MercadoPago" => Ok(PaymentProvider::MercadoPago),
        "Manual" => Ok(PaymentProvider::Manual),
        other => Err(DbError::Decode(format!("unknown payment provider: {other}"))),
    }
}

fn provider_to_string(p: PaymentProvider) -> &'static str {
    match p {
        PaymentProvider::Stripe => "Stripe",
        PaymentProvider::PayPal => "PayPal",
        PaymentProvider::MercadoPago => "MercadoPago",
        PaymentProvider::Manual => "Manual",
    }
}

impl PaymentConfigRow {
    fn try_into_config(self) -> Result<PaymentConfig, DbError> {
        Ok(PaymentConfig {
            id: parse_uuid(&self.record_id, "payment_config")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            provider: parse_provider(&self.provider)?,
            public_key: self.public_key,
            secret_key: self.secret_key,
            sandbox: self.sandbox,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the PaymentConfig repository.
#[derive(Clone)]
pub struct SurrealPaymentConfigRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPaymentConfigRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<PaymentConfig> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::record('payment_config', $id) \
                 WHERE {}",
                filter.clause()
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PaymentConfigRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "payment_config", id_str)?.try_into_config()?)
    }
}

impl<C: Connection> PaymentConfigRepository for SurrealPaymentConfigRepository<C> {
    async fn upsert(
        &self,
        ctx: &TenantContext,
        input: UpsertPaymentConfig,
    ) -> RaffleResult<PaymentConfig> {
        let filter = TenantFilter::write(ctx)?;

        // (tenant, provider) is unique; reuse the existing record key.
        let id_str = match self.get_by_provider(ctx, input.provider).await {
            Ok(existing) => existing.id.to_string(),
            Err(RaffleError::NotFound { .. }) => Uuid::new_v4().to_string(),
            Err(e) => return Err(e),
        };

        let result = self
            .db
            .query(format!(
                "UPSERT type::record('payment_config', $id) MERGE {{ \
                 tenant_id: $tenant_id, provider: $provider, \
                 public_key: $public_key, secret_key: $secret_key, \
                 sandbox: $sandbox, updated_at: time::now() \
                 }} RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('payment_config', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .bind(("provider", provider_to_string(input.provider).to_string()))
            .bind(("public_key", input.public_key))
            .bind(("secret_key", input.secret_key))
            .bind(("sandbox", input.sandbox))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("payment_config", e))?;

        let rows: Vec<PaymentConfigRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "payment_config", id_str)?.try_into_config()?)
    }

    async fn get_by_provider(
        &self,
        ctx: &TenantContext,
        provider: PaymentProvider,
    ) -> RaffleResult<PaymentConfig> {
        let filter = TenantFilter::read(ctx)?;
        let provider = provider_to_string(provider);

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM payment_config \
                 WHERE {} AND provider = $provider LIMIT 1",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("provider", provider.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PaymentConfigRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "payment_config", format!("provider={provider}"))?
            .try_into_config()?)
    }

    async fn get_active(&self, ctx: &TenantContext) -> RaffleResult<Option<PaymentConfig>> {
        let filter = TenantFilter::read(ctx)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM payment_config \
                 WHERE {} AND is_active = true LIMIT 1",
                filter.clause()
            ))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PaymentConfigRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.try_into_config())
            .transpose()?)
    }

    async fn list(&self, ctx: &TenantContext) -> RaffleResult<Vec<PaymentConfig>> {
        let filter = TenantFilter::read(ctx)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM payment_config WHERE {} \
                 ORDER BY created_at ASC",
                filter.clause()
            ))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PaymentConfigRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_config())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn activate(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<PaymentConfig> {
        // The owning tenant comes from the row, so the admin global view
        // deactivates the right siblings.
        let config = self.get_by_id(ctx, id).await?;

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE payment_config SET is_active = false, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id AND is_active = true RETURN NONE; \
                 UPDATE type::record('payment_config', $id) SET \
                 is_active = true, updated_at = time::now() RETURN NONE; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", config.tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_statement("payment_config", e))?;

        self.get_by_id(ctx, id).await
    }

    async fn delete(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        self.get_by_id(ctx, id).await?;

        self.db
            .query("DELETE type::record('payment_config', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
