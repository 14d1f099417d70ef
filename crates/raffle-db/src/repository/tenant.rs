//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use raffle_core::error::RaffleResult;
use raffle_core::models::tenant::{CreateTenant, Tenant, TenantPlan, TenantStatus, UpdateTenant};
use raffle_core::repository::{PaginatedResult, Pagination, TenantRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{CountRow, RECORD_FIELDS, first_or_not_found, parse_uuid, total};

#[derive(Debug, SurrealValue)]
struct TenantRow {
    record_id: String,
    slug: String,
    name: String,
    status: String,
    plan: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<TenantStatus, DbError> {
    match s {
        "Active" => Ok(TenantStatus::Active),
        "Suspended" => Ok(TenantStatus::Suspended),
        "Deleted" => Ok(TenantStatus::Deleted),
        other => Err(DbError::Decode(format!("unknown tenant status: {other}"))),
    }
}

fn status_to_string(s: TenantStatus) -> &'static str {
    match s {
        TenantStatus::Active => "Active",
        TenantStatus::Suspended => "Suspended",
        TenantStatus::Deleted => "Deleted",
    }
}

fn parse_plan(s: &str) -> Result<TenantPlan, DbError> {
    match s {
        "Basic" => Ok(TenantPlan::Basic),
        "Pro" => Ok(TenantPlan::Pro),
        "Enterprise" => Ok(TenantPlan::Enterprise),
        other => Err(DbError::Decode(format!("unknown tenant plan: {other}"))),
    }
}

fn plan_to_string(p: TenantPlan) -> &'static str {
    match p {
        TenantPlan::Basic => "Basic",
        TenantPlan::Pro => "Pro",
        TenantPlan::Enterprise => "Enterprise",
    }
}

impl TenantRow {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        Ok(Tenant {
            id: parse_uuid(&self.record_id, "tenant")?,
            slug: self.slug,
            name: self.name,
            status: parse_status(&self.status)?,
            plan: parse_plan(&self.plan)?,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> RaffleResult<Tenant> {
        let id_str = Uuid::new_v4().to_string();
        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));
        let plan = input.plan.unwrap_or(TenantPlan::Basic);

        let result = self
            .db
            .query(format!(
                "CREATE type::record('tenant', $id) SET \
                 slug = $slug, name = $name, \
                 status = 'Active', plan = $plan, \
                 metadata = $metadata RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('tenant', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(("slug", input.slug))
            .bind(("name", input.name))
            .bind(("plan", plan_to_string(plan).to_string()))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("tenant", e))?;

        // Statement 0 is the CREATE, statement 1 reads the row back.
        let rows: Vec<TenantRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "tenant", id_str)?.try_into_tenant()?)
    }

    async fn get_by_id(&self, id: Uuid) -> RaffleResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!("SELECT {RECORD_FIELDS} FROM type::record('tenant', $id)"))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "tenant", id_str)?.try_into_tenant()?)
    }

    async fn get_by_slug(&self, slug: &str) -> RaffleResult<Tenant> {
        let mut result = self
            .db
            .query(format!("SELECT {RECORD_FIELDS} FROM tenant WHERE slug = $slug"))
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "tenant", format!("slug={slug}"))?.try_into_tenant()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> RaffleResult<Tenant> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.plan.is_some() {
            sets.push("plan = $plan");
        }
        if input.metadata.is_some() {
            sets.push("metadata = $metadata");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('tenant', $id) SET {} RETURN NONE; \
             SELECT {RECORD_FIELDS} FROM type::record('tenant', $id);",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id_str.clone()));

        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        if let Some(plan) = input.plan {
            builder = builder.bind(("plan", plan_to_string(plan).to_string()));
        }
        if let Some(metadata) = input.metadata {
            builder = builder.bind(("metadata", metadata));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("tenant", e))?;

        let rows: Vec<TenantRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "tenant", id_str)?.try_into_tenant()?)
    }

    async fn delete(&self, id: Uuid) -> RaffleResult<()> {
        // Soft-delete: business rows keep pointing at the tenant.
        self.db
            .query(
                "UPDATE type::record('tenant', $id) SET \
                 status = 'Deleted', updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> RaffleResult<PaginatedResult<Tenant>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM tenant GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM tenant ORDER BY created_at ASC \
                 LIMIT $limit START $offset"
            ))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_tenant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: total(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
