//! SurrealDB implementation of [`AmbassadorRepository`].

use chrono::{DateTime, Utc};
use raffle_core::context::TenantContext;
use raffle_core::error::RaffleResult;
use raffle_core::models::ambassador::{Ambassador, CreateAmbassador, UpdateAmbassador};
use raffle_core::repository::{AmbassadorRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{CountRow, RECORD_FIELDS, first_or_not_found, parse_uuid, total};
use crate::scope::TenantFilter;

#[derive(Debug, SurrealValue)]
struct AmbassadorRow {
    record_id: String,
    tenant_id: String,
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

impl AmbassadorRow {
    fn try_into_ambassador(self) -> Result<Ambassador, DbError> {
        Ok(Ambassador {
            id: parse_uuid(&self.record_id, "ambassador")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
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

/// SurrealDB implementation of the Ambassador repository.
#[derive(Clone)]
pub struct SurrealAmbassadorRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAmbassadorRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one(
        &self,
        ctx: &TenantContext,
        field: &'static str,
        value: String,
    ) -> RaffleResult<Ambassador> {
        let filter = TenantFilter::read(ctx)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM ambassador \
                 WHERE {} AND {field} = $value LIMIT 1",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("value", value.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AmbassadorRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "ambassador", format!("{field}={value}"))?
            .try_into_ambassador()?)
    }
}

impl<C: Connection> AmbassadorRepository for SurrealAmbassadorRepository<C> {
    async fn create(&self, ctx: &TenantContext, input: CreateAmbassador) -> RaffleResult<Ambassador> {
        let filter = TenantFilter::write(ctx)?;
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(format!(
                "CREATE type::record('ambassador', $id) SET \
                 tenant_id = $tenant_id, name = $name, email = $email, \
                 phone = $phone, code = $code, \
                 commission_rate = $commission_rate, \
                 team_commission_rate = $team_commission_rate \
                 RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('ambassador', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
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
            .map_err(|e| DbError::from_statement("ambassador", e))?;

        let rows: Vec<AmbassadorRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "ambassador", id_str)?.try_into_ambassador()?)
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<Ambassador> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::record('ambassador', $id) \
                 WHERE {}",
                filter.clause()
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AmbassadorRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "ambassador", id_str)?.try_into_ambassador()?)
    }

    async fn get_by_code(&self, ctx: &TenantContext, code: &str) -> RaffleResult<Ambassador> {
        self.find_one(ctx, "code", code.to_string()).await
    }

    async fn get_by_email(&self, ctx: &TenantContext, email: &str) -> RaffleResult<Ambassador> {
        self.find_one(ctx, "email", email.to_string()).await
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateAmbassador,
    ) -> RaffleResult<Ambassador> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut sets = Vec::new();
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
            "UPDATE type::record('ambassador', $id) SET {} \
             WHERE {clause} RETURN NONE; \
             SELECT {RECORD_FIELDS} FROM type::record('ambassador', $id) \
             WHERE {clause};",
            sets.join(", "),
            clause = filter.clause(),
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(filter.binding());

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
            .map_err(|e| DbError::from_statement("ambassador", e))?;

        let rows: Vec<AmbassadorRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "ambassador", id_str)?.try_into_ambassador()?)
    }

    async fn delete(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        // Resolves through the tenant filter first so a foreign id is NotFound.
        self.get_by_id(ctx, id).await?;

        self.db
            .query("DELETE type::record('ambassador', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> RaffleResult<PaginatedResult<Ambassador>> {
        let filter = TenantFilter::read(ctx)?;

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM ambassador WHERE {} GROUP ALL",
                filter.clause()
            ))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM ambassador WHERE {} \
                 ORDER BY created_at ASC LIMIT $limit START $offset",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AmbassadorRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_ambassador())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: total(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
