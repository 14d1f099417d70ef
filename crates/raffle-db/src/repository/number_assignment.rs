//! SurrealDB implementation of [`NumberAssignmentRepository`].
//!
//! The holder is stored as a `holder_type` / `holder_id` pair.

use chrono::{DateTime, Utc};
use raffle_core::context::TenantContext;
use raffle_core::error::RaffleResult;
use raffle_core::models::number_assignment::{
    AssignmentHolder, AssignmentStatus, CreateNumberAssignment, NumberAssignment,
};
use raffle_core::ranges::NumberRange;
use raffle_core::repository::NumberAssignmentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{RECORD_FIELDS, first_or_not_found, parse_uuid};
use crate::scope::TenantFilter;

const TABLE: &str = "raffle_number_assignment";

#[derive(Debug, SurrealValue)]
struct AssignmentRow {
    record_id: String,
    tenant_id: String,
    raffle_id: String,
    holder_type: String,
    holder_id: String,
    range_start: u64,
    range_end: u64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_holder(kind: &str, id: &str) -> Result<AssignmentHolder, DbError> {
    let id = parse_uuid(id, "holder")?;
    match kind {
        "Referral" => Ok(AssignmentHolder::Referral(id)),
        "Ambassador" => Ok(AssignmentHolder::Ambassador(id)),
        other => Err(DbError::Decode(format!("unknown holder type: {other}"))),
    }
}

fn holder_type(holder: &AssignmentHolder) -> &'static str {
    match holder {
        AssignmentHolder::Referral(_) => "Referral",
        AssignmentHolder::Ambassador(_) => "Ambassador",
    }
}

fn parse_status(s: &str) -> Result<AssignmentStatus, DbError> {
    match s {
        "Assigned" => Ok(AssignmentStatus::Assigned),
        "Released" => Ok(AssignmentStatus::Released),
        other => Err(DbError::Decode(format!("unknown assignment status: {other}"))),
    }
}

fn status_to_string(s: AssignmentStatus) -> &'static str {
    match s {
        AssignmentStatus::Assigned => "Assigned",
        AssignmentStatus::Released => "Released",
    }
}

impl AssignmentRow {
    fn try_into_assignment(self) -> Result<NumberAssignment, DbError> {
        Ok(NumberAssignment {
            id: parse_uuid(&self.record_id, "assignment")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            raffle_id: parse_uuid(&self.raffle_id, "raffle")?,
            holder: parse_holder(&self.holder_type, &self.holder_id)?,
            range_start: self.range_start,
            range_end: self.range_end,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_assignments(rows: Vec<AssignmentRow>) -> Result<Vec<NumberAssignment>, DbError> {
    rows.into_iter().map(|row| row.try_into_assignment()).collect()
}

/// SurrealDB implementation of the NumberAssignment repository.
#[derive(Clone)]
pub struct SurrealNumberAssignmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNumberAssignmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NumberAssignmentRepository for SurrealNumberAssignmentRepository<C> {
    async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateNumberAssignment,
    ) -> RaffleResult<NumberAssignment> {
        let filter = TenantFilter::write(ctx)?;
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(format!(
                "CREATE type::record('{TABLE}', $id) SET \
                 tenant_id = $tenant_id, raffle_id = $raffle_id, \
                 holder_type = $holder_type, holder_id = $holder_id, \
                 range_start = $range_start, range_end = $range_end, \
                 status = 'Assigned' RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('{TABLE}', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .bind(("raffle_id", input.raffle_id.to_string()))
            .bind(("holder_type", holder_type(&input.holder).to_string()))
            .bind(("holder_id", input.holder.id().to_string()))
            .bind(("range_start", input.range_start))
            .bind(("range_end", input.range_end))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("assignment", e))?;

        let rows: Vec<AssignmentRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "assignment", id_str)?.try_into_assignment()?)
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<NumberAssignment> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::record('{TABLE}', $id) WHERE {}",
                filter.clause()
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssignmentRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "assignment", id_str)?.try_into_assignment()?)
    }

    async fn list_by_raffle(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        status: Option<AssignmentStatus>,
    ) -> RaffleResult<Vec<NumberAssignment>> {
        let filter = TenantFilter::read(ctx)?;
        let status_clause = if status.is_some() {
            " AND status = $status"
        } else {
            ""
        };

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM {TABLE} \
                 WHERE {} AND raffle_id = $raffle_id{status_clause} \
                 ORDER BY range_start ASC",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("raffle_id", raffle_id.to_string()))
            .bind(("status", status.map(|s| status_to_string(s).to_string())))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssignmentRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_assignments(rows)?)
    }

    async fn find_overlapping(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        range: NumberRange,
    ) -> RaffleResult<Vec<NumberAssignment>> {
        let filter = TenantFilter::read(ctx)?;

        // Inclusive intersection: existing.start <= new.end AND existing.end >= new.start.
        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM {TABLE} \
                 WHERE {} AND raffle_id = $raffle_id AND status = 'Assigned' \
                 AND range_start <= $end AND range_end >= $start \
                 ORDER BY range_start ASC",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("raffle_id", raffle_id.to_string()))
            .bind(("start", range.start))
            .bind(("end", range.end))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssignmentRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_assignments(rows)?)
    }

    async fn list_by_holder(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        holder: AssignmentHolder,
    ) -> RaffleResult<Vec<NumberAssignment>> {
        let filter = TenantFilter::read(ctx)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM {TABLE} \
                 WHERE {} AND raffle_id = $raffle_id AND status = 'Assigned' \
                 AND holder_type = $holder_type AND holder_id = $holder_id \
                 ORDER BY range_start ASC",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("raffle_id", raffle_id.to_string()))
            .bind(("holder_type", holder_type(&holder).to_string()))
            .bind(("holder_id", holder.id().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssignmentRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_assignments(rows)?)
    }

    async fn set_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        status: AssignmentStatus,
    ) -> RaffleResult<NumberAssignment> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let result = self
            .db
            .query(format!(
                "UPDATE type::record('{TABLE}', $id) SET \
                 status = $status, updated_at = time::now() \
                 WHERE {clause} RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('{TABLE}', $id) \
                 WHERE {clause};",
                clause = filter.clause(),
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .bind(("status", status_to_string(status).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("assignment", e))?;

        let rows: Vec<AssignmentRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "assignment", id_str)?.try_into_assignment()?)
    }

    async fn delete(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        self.get_by_id(ctx, id).await?;

        self.db
            .query(format!("DELETE type::record('{TABLE}', $id)"))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
