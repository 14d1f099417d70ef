//! SurrealDB implementation of [`EmailConfigRepository`].

use chrono::{DateTime, Utc};
use raffle_core::context::TenantContext;
use raffle_core::error::{RaffleError, RaffleResult};
use raffle_core::models::email_config::{EmailConfig, EmailProvider, UpsertEmailConfig};
use raffle_core::repository::EmailConfigRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{RECORD_FIELDS, first_or_not_found, parse_uuid};
use crate::scope::TenantFilter;

#[derive(Debug, SurrealValue)]
struct EmailConfigRow {
    record_id: String,
    tenant_id: String,
    provider: String,
    from_email: String,
    from_name: String,
    api_key: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_provider(s: &str) -> Result<EmailProvider, DbError> {
    match s {
        "Resend" => Ok(EmailProvider::Resend),
        "SendGrid" => Ok(EmailProvider::SendGrid),
        "Smtp" => Ok(EmailProvider::Smtp),
        other => Err(DbError::Decode(format!("unknown email provider: {other}"))),
    }
}

fn provider_to_string(p: EmailProvider) -> &'static str {
    match p {
        EmailProvider::Resend => "Resend",
        EmailProvider::SendGrid => "SendGrid",
        EmailProvider::Smtp => "Smtp",
    }
}

impl EmailConfigRow {
    fn try_into_config(self) -> Result<EmailConfig, DbError> {
        Ok(EmailConfig {
            id: parse_uuid(&self.record_id, "email_config")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            provider: parse_provider(&self.provider)?,
            from_email: self.from_email,
            from_name: self.from_name,
            api_key: self.api_key,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_configs(rows: Vec<EmailConfigRow>) -> Result<Vec<EmailConfig>, DbError> {
    rows.into_iter().map(|row| row.try_into_config()).collect()
}

/// SurrealDB implementation of the EmailConfig repository.
#[derive(Clone)]
pub struct SurrealEmailConfigRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEmailConfigRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn query_configs(
        &self,
        ctx: &TenantContext,
        condition: &str,
        provider: Option<EmailProvider>,
    ) -> RaffleResult<Vec<EmailConfig>> {
        let filter = TenantFilter::read(ctx)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM email_config WHERE {} AND {condition} \
                 ORDER BY created_at ASC",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("provider", provider.map(|p| provider_to_string(p).to_string())))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmailConfigRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_configs(rows)?)
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<EmailConfig> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::record('email_config', $id) \
                 WHERE {}",
                filter.clause()
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmailConfigRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "email_config", id_str)?.try_into_config()?)
    }
}

impl<C: Connection> EmailConfigRepository for SurrealEmailConfigRepository<C> {
    async fn upsert(
        &self,
        ctx: &TenantContext,
        input: UpsertEmailConfig,
    ) -> RaffleResult<EmailConfig> {
        let filter = TenantFilter::write(ctx)?;

        let id_str = match self.get_by_provider(ctx, input.provider).await {
            Ok(existing) => existing.id.to_string(),
            Err(RaffleError::NotFound { .. }) => Uuid::new_v4().to_string(),
            Err(e) => return Err(e),
        };

        let result = self
            .db
            .query(format!(
                "UPSERT type::record('email_config', $id) MERGE {{ \
                 tenant_id: $tenant_id, provider: $provider, \
                 from_email: $from_email, from_name: $from_name, \
                 api_key: $api_key, updated_at: time::now() \
                 }} RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('email_config', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .bind(("provider", provider_to_string(input.provider).to_string()))
            .bind(("from_email", input.from_email))
            .bind(("from_name", input.from_name))
            .bind(("api_key", input.api_key))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("email_config", e))?;

        let rows: Vec<EmailConfigRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "email_config", id_str)?.try_into_config()?)
    }

    async fn get_by_provider(
        &self,
        ctx: &TenantContext,
        provider: EmailProvider,
    ) -> RaffleResult<EmailConfig> {
        let rows = self
            .query_configs(ctx, "provider = $provider", Some(provider))
            .await?;
        rows.into_iter().next().ok_or_else(|| {
            RaffleError::not_found("email_config", format!("provider={}", provider_to_string(provider)))
        })
    }

    async fn get_active(&self, ctx: &TenantContext) -> RaffleResult<Option<EmailConfig>> {
        let rows = self.query_configs(ctx, "is_active = true", None).await?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self, ctx: &TenantContext) -> RaffleResult<Vec<EmailConfig>> {
        self.query_configs(ctx, "true", None).await
    }

    async fn activate(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<EmailConfig> {
        let config = self.get_by_id(ctx, id).await?;

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE email_config SET is_active = false, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id AND is_active = true RETURN NONE; \
                 UPDATE type::record('email_config', $id) SET \
                 is_active = true, updated_at = time::now() RETURN NONE; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", config.tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_statement("email_config", e))?;

        self.get_by_id(ctx, id).await
    }

    async fn delete(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        self.get_by_id(ctx, id).await?;

        self.db
            .query("DELETE type::record('email_config', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
