//! SurrealDB implementation of [`RaffleRepository`].

use chrono::{DateTime, Utc};
use raffle_core::context::TenantContext;
use raffle_core::error::RaffleResult;
use raffle_core::models::raffle::{CreateRaffle, Raffle, RaffleStatus, UpdateRaffle};
use raffle_core::repository::{PaginatedResult, Pagination, RaffleRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{CountRow, RECORD_FIELDS, first_or_not_found, parse_uuid, total};
use crate::scope::TenantFilter;

#[derive(Debug, SurrealValue)]
struct RaffleRow {
    record_id: String,
    tenant_id: String,
    title: String,
    description: String,
    status: String,
    total_numbers: u64,
    ticket_price: f64,
    draw_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<RaffleStatus, DbError> {
    match s {
        "Draft" => Ok(RaffleStatus::Draft),
        "Active" => Ok(RaffleStatus::Active),
        "Paused" => Ok(RaffleStatus::Paused),
        "Completed" => Ok(RaffleStatus::Completed),
        other => Err(DbError::Decode(format!("unknown raffle status: {other}"))),
    }
}

fn status_to_string(s: RaffleStatus) -> &'static str {
    match s {
        RaffleStatus::Draft => "Draft",
        RaffleStatus::Active => "Active",
        RaffleStatus::Paused => "Paused",
        RaffleStatus::Completed => "Completed",
    }
}

impl RaffleRow {
    fn try_into_raffle(self) -> Result<Raffle, DbError> {
        Ok(Raffle {
            id: parse_uuid(&self.record_id, "raffle")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            title: self.title,
            description: self.description,
            status: parse_status(&self.status)?,
            total_numbers: self.total_numbers,
            ticket_price: self.ticket_price,
            draw_date: self.draw_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Raffle repository.
#[derive(Clone)]
pub struct SurrealRaffleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRaffleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RaffleRepository for SurrealRaffleRepository<C> {
    async fn create(&self, ctx: &TenantContext, input: CreateRaffle) -> RaffleResult<Raffle> {
        let filter = TenantFilter::write(ctx)?;
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(format!(
                "CREATE type::record('raffle', $id) SET \
                 tenant_id = $tenant_id, title = $title, \
                 description = $description, status = 'Draft', \
                 total_numbers = $total_numbers, ticket_price = $ticket_price, \
                 draw_date = $draw_date RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('raffle', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .bind(("title", input.title))
            .bind(("description", input.description.unwrap_or_default()))
            .bind(("total_numbers", input.total_numbers))
            .bind(("ticket_price", input.ticket_price))
            .bind(("draw_date", input.draw_date))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("raffle", e))?;

        let rows: Vec<RaffleRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "raffle", id_str)?.try_into_raffle()?)
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<Raffle> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::record('raffle', $id) WHERE {}",
                filter.clause()
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RaffleRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "raffle", id_str)?.try_into_raffle()?)
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateRaffle,
    ) -> RaffleResult<Raffle> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.total_numbers.is_some() {
            sets.push("total_numbers = $total_numbers");
        }
        if input.ticket_price.is_some() {
            sets.push("ticket_price = $ticket_price");
        }
        if input.draw_date.is_some() {
            sets.push("draw_date = $draw_date");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('raffle', $id) SET {} \
             WHERE {clause} RETURN NONE; \
             SELECT {RECORD_FIELDS} FROM type::record('raffle', $id) \
             WHERE {clause};",
            sets.join(", "),
            clause = filter.clause(),
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(filter.binding());

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        if let Some(total_numbers) = input.total_numbers {
            builder = builder.bind(("total_numbers", total_numbers));
        }
        if let Some(ticket_price) = input.ticket_price {
            builder = builder.bind(("ticket_price", ticket_price));
        }
        if let Some(draw_date) = input.draw_date {
            builder = builder.bind(("draw_date", draw_date));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("raffle", e))?;

        let rows: Vec<RaffleRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "raffle", id_str)?.try_into_raffle()?)
    }

    async fn delete(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        self.get_by_id(ctx, id).await?;

        self.db
            .query("DELETE type::record('raffle', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> RaffleResult<PaginatedResult<Raffle>> {
        let filter = TenantFilter::read(ctx)?;

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM raffle WHERE {} GROUP ALL",
                filter.clause()
            ))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM raffle WHERE {} \
                 ORDER BY created_at ASC LIMIT $limit START $offset",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RaffleRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_raffle())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: total(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
