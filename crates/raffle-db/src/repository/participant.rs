//! SurrealDB implementation of [`ParticipantRepository`].

use chrono::{DateTime, Utc};
use raffle_core::context::TenantContext;
use raffle_core::error::RaffleResult;
use raffle_core::models::participant::{CreateParticipant, Participant};
use raffle_core::repository::{PaginatedResult, Pagination, ParticipantRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{CountRow, RECORD_FIELDS, first_or_not_found, parse_uuid, total};
use crate::scope::TenantFilter;

#[derive(Debug, SurrealValue)]
struct ParticipantRow {
    record_id: String,
    tenant_id: String,
    name: String,
    email: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl ParticipantRow {
    fn try_into_participant(self) -> Result<Participant, DbError> {
        Ok(Participant {
            id: parse_uuid(&self.record_id, "participant")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            name: self.name,
            email: self.email,
            phone: self.phone,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Participant repository.
#[derive(Clone)]
pub struct SurrealParticipantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealParticipantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ParticipantRepository for SurrealParticipantRepository<C> {
    async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateParticipant,
    ) -> RaffleResult<Participant> {
        let filter = TenantFilter::write(ctx)?;
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(format!(
                "CREATE type::record('participant', $id) SET \
                 tenant_id = $tenant_id, name = $name, email = $email, \
                 phone = $phone RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('participant', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("participant", e))?;

        let rows: Vec<ParticipantRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "participant", id_str)?.try_into_participant()?)
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<Participant> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::record('participant', $id) WHERE {}",
                filter.clause()
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ParticipantRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "participant", id_str)?.try_into_participant()?)
    }

    async fn get_by_email(&self, ctx: &TenantContext, email: &str) -> RaffleResult<Participant> {
        let filter = TenantFilter::read(ctx)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM participant \
                 WHERE {} AND email = $email LIMIT 1",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ParticipantRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "participant", format!("email={email}"))?
            .try_into_participant()?)
    }

    async fn list(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> RaffleResult<PaginatedResult<Participant>> {
        let filter = TenantFilter::read(ctx)?;

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM participant WHERE {} GROUP ALL",
                filter.clause()
            ))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM participant WHERE {} \
                 ORDER BY created_at ASC LIMIT $limit START $offset",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ParticipantRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_participant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: total(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
