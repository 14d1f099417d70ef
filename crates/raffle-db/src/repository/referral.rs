//! SurrealDB implementation of [`ReferralRepository`].

use chrono::{DateTime, Utc};
use raffle_core::context::TenantContext;
use raffle_core::error::RaffleResult;
use raffle_core::models::referral::{CreateReferral, Referral, UpdateReferral};
use raffle_core::repository::{PaginatedResult, Pagination, ReferralRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{CountRow, RECORD_FIELDS, first_or_not_found, parse_opt_uuid, parse_uuid, total};
use crate::scope::TenantFilter;

#[derive(Debug, SurrealValue)]
struct ReferralRow {
    record_id: String,
    tenant_id: String,
    ambassador_id: Option<String>,
    name: String,
    email: String,
    phone: Option<String>,
    code: String,
    commission_rate: f64,
    team_commission_rate: f64,
    is_active: bool,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReferralRow {
    fn try_into_referral(self) -> Result<Referral, DbError> {
        Ok(Referral {
            id: parse_uuid(&self.record_id, "referral")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            ambassador_id: parse_opt_uuid(self.ambassador_id, "ambassador")?,
            name: self.name,
            email: self.email,
            phone: self.phone,
            code: self.code,
            commission_rate: self.commission_rate,
            team_commission_rate: self.team_commission_rate,
            is_active: self.is_active,
            email_verified: self.email_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_referrals(rows: Vec<ReferralRow>) -> Result<Vec<Referral>, DbError> {
    rows.into_iter().map(|row| row.try_into_referral()).collect()
}

/// SurrealDB implementation of the Referral repository.
#[derive(Clone)]
pub struct SurrealReferralRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReferralRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one(
        &self,
        ctx: &TenantContext,
        field: &'static str,
        value: String,
    ) -> RaffleResult<Referral> {
        let filter = TenantFilter::read(ctx)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM referral \
                 WHERE {} AND {field} = $value LIMIT 1",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("value", value.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReferralRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "referral", format!("{field}={value}"))?.try_into_referral()?)
    }
}

impl<C: Connection> ReferralRepository for SurrealReferralRepository<C> {
    async fn create(&self, ctx: &TenantContext, input: CreateReferral) -> RaffleResult<Referral> {
        let filter = TenantFilter::write(ctx)?;
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(format!(
                "CREATE type::record('referral', $id) SET \
                 tenant_id = $tenant_id, ambassador_id = $ambassador_id, \
                 name = $name, email = $email, phone = $phone, code = $code, \
                 commission_rate = $commission_rate, \
                 team_commission_rate = $team_commission_rate \
                 RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('referral', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .bind(("ambassador_id", input.ambassador_id.map(|id| id.to_string())))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("code", input.code))
            .bind(("commission_rate", input.commission_rate))
            .bind(("team_commission_rate", input.team_commission_rate))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("referral", e))?;

        let rows: Vec<ReferralRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "referral", id_str)?.try_into_referral()?)
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<Referral> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::record('referral', $id) WHERE {}",
                filter.clause()
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReferralRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "referral", id_str)?.try_into_referral()?)
    }

    async fn get_by_code(&self, ctx: &TenantContext, code: &str) -> RaffleResult<Referral> {
        self.find_one(ctx, "code", code.to_string()).await
    }

    async fn get_by_email(&self, ctx: &TenantContext, email: &str) -> RaffleResult<Referral> {
        self.find_one(ctx, "email", email.to_string()).await
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateReferral,
    ) -> RaffleResult<Referral> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.ambassador_id.is_some() {
            sets.push("ambassador_id = $ambassador_id");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.code.is_some() {
            sets.push("code = $code");
        }
        if input.commission_rate.is_some() {
            sets.push("commission_rate = $commission_rate");
        }
        if input.team_commission_rate.is_some() {
            sets.push("team_commission_rate = $team_commission_rate");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.email_verified.is_some() {
            sets.push("email_verified = $email_verified");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('referral', $id) SET {} \
             WHERE {clause} RETURN NONE; \
             SELECT {RECORD_FIELDS} FROM type::record('referral', $id) \
             WHERE {clause};",
            sets.join(", "),
            clause = filter.clause(),
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(filter.binding());

        if let Some(ambassador_id) = input.ambassador_id {
            builder = builder.bind(("ambassador_id", ambassador_id.map(|id| id.to_string())));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(code) = input.code {
            builder = builder.bind(("code", code));
        }
        if let Some(rate) = input.commission_rate {
            builder = builder.bind(("commission_rate", rate));
        }
        if let Some(rate) = input.team_commission_rate {
            builder = builder.bind(("team_commission_rate", rate));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(verified) = input.email_verified {
            builder = builder.bind(("email_verified", verified));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("referral", e))?;

        let rows: Vec<ReferralRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "referral", id_str)?.try_into_referral()?)
    }

    async fn delete(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        self.get_by_id(ctx, id).await?;

        self.db
            .query("DELETE type::record('referral', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> RaffleResult<PaginatedResult<Referral>> {
        let filter = TenantFilter::read(ctx)?;

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM referral WHERE {} GROUP ALL",
                filter.clause()
            ))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM referral WHERE {} \
                 ORDER BY created_at ASC LIMIT $limit START $offset",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReferralRow> = result.take(0).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: into_referrals(rows)?,
            total: total(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_ambassador(
        &self,
        ctx: &TenantContext,
        ambassador_id: Uuid,
    ) -> RaffleResult<Vec<Referral>> {
        let filter = TenantFilter::read(ctx)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM referral \
                 WHERE {} AND ambassador_id = $ambassador_id \
                 ORDER BY created_at ASC",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("ambassador_id", ambassador_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReferralRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_referrals(rows)?)
    }
}
