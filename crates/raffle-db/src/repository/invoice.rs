//! SurrealDB implementation of [`InvoiceRepository`].

use chrono::{DateTime, Utc};
use raffle_core::context::TenantContext;
use raffle_core::error::RaffleResult;
use raffle_core::models::invoice::{CreateInvoice, Invoice, InvoiceStatus};
use raffle_core::repository::{InvoiceRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{CountRow, RECORD_FIELDS, first_or_not_found, parse_opt_uuid, parse_uuid, total};
use crate::scope::TenantFilter;

#[derive(Debug, SurrealValue)]
struct InvoiceRow {
    record_id: String,
    tenant_id: String,
    raffle_id: String,
    participant_id: String,
    package_id: Option<String>,
    referral_id: Option<String>,
    ambassador_id: Option<String>,
    quantity: u32,
    total_price: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<InvoiceStatus, DbError> {
    match s {
        "Pending" => Ok(InvoiceStatus::Pending),
        "Completed" => Ok(InvoiceStatus::Completed),
        "Paid" => Ok(InvoiceStatus::Paid),
        "Cancelled" => Ok(InvoiceStatus::Cancelled),
        "Refunded" => Ok(InvoiceStatus::Refunded),
        other => Err(DbError::Decode(format!("unknown invoice status: {other}"))),
    }
}

fn status_to_string(s: InvoiceStatus) -> &'static str {
    match s {
        InvoiceStatus::Pending => "Pending",
        InvoiceStatus::Completed => "Completed",
        InvoiceStatus::Paid => "Paid",
        InvoiceStatus::Cancelled => "Cancelled",
        InvoiceStatus::Refunded => "Refunded",
    }
}

impl InvoiceRow {
    fn try_into_invoice(self) -> Result<Invoice, DbError> {
        Ok(Invoice {
            id: parse_uuid(&self.record_id, "invoice")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            raffle_id: parse_uuid(&self.raffle_id, "raffle")?,
            participant_id: parse_uuid(&self.participant_id, "participant")?,
            package_id: parse_opt_uuid(self.package_id, "package")?,
            referral_id: parse_opt_uuid(self.referral_id, "referral")?,
            ambassador_id: parse_opt_uuid(self.ambassador_id, "ambassador")?,
            quantity: self.quantity,
            total_price: self.total_price,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_invoices(rows: Vec<InvoiceRow>) -> Result<Vec<Invoice>, DbError> {
    rows.into_iter().map(|row| row.try_into_invoice()).collect()
}

/// SurrealDB implementation of the Invoice repository.
#[derive(Clone)]
pub struct SurrealInvoiceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealInvoiceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> InvoiceRepository for SurrealInvoiceRepository<C> {
    async fn create(&self, ctx: &TenantContext, input: CreateInvoice) -> RaffleResult<Invoice> {
        let filter = TenantFilter::write(ctx)?;
        let id_str = Uuid::new_v4().to_string();
        let status = input.status.unwrap_or(InvoiceStatus::Pending);

        let result = self
            .db
            .query(format!(
                "CREATE type::record('invoice', $id) SET \
                 tenant_id = $tenant_id, raffle_id = $raffle_id, \
                 participant_id = $participant_id, package_id = $package_id, \
                 referral_id = $referral_id, ambassador_id = $ambassador_id, \
                 quantity = $quantity, total_price = $total_price, \
                 status = $status RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('invoice', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .bind(("raffle_id", input.raffle_id.to_string()))
            .bind(("participant_id", input.participant_id.to_string()))
            .bind(("package_id", input.package_id.map(|id| id.to_string())))
            .bind(("referral_id", input.referral_id.map(|id| id.to_string())))
            .bind(("ambassador_id", input.ambassador_id.map(|id| id.to_string())))
            .bind(("quantity", input.quantity))
            .bind(("total_price", input.total_price))
            .bind(("status", status_to_string(status).to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("invoice", e))?;

        let rows: Vec<InvoiceRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "invoice", id_str)?.try_into_invoice()?)
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<Invoice> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::record('invoice', $id) WHERE {}",
                filter.clause()
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvoiceRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "invoice", id_str)?.try_into_invoice()?)
    }

    async fn update_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        status: InvoiceStatus,
    ) -> RaffleResult<Invoice> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let result = self
            .db
            .query(format!(
                "UPDATE type::record('invoice', $id) SET \
                 status = $status, updated_at = time::now() \
                 WHERE {clause} RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('invoice', $id) \
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
            .map_err(|e| DbError::from_statement("invoice", e))?;

        let rows: Vec<InvoiceRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "invoice", id_str)?.try_into_invoice()?)
    }

    async fn list_by_raffle(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
        pagination: Pagination,
    ) -> RaffleResult<PaginatedResult<Invoice>> {
        let filter = TenantFilter::read(ctx)?;
        let raffle_id = raffle_id.to_string();

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM invoice \
                 WHERE {} AND raffle_id = $raffle_id GROUP ALL",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("raffle_id", raffle_id.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM invoice \
                 WHERE {} AND raffle_id = $raffle_id \
                 ORDER BY created_at ASC LIMIT $limit START $offset",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("raffle_id", raffle_id))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvoiceRow> = result.take(0).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: into_invoices(rows)?,
            total: total(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_ambassador(
        &self,
        ctx: &TenantContext,
        ambassador_id: Uuid,
    ) -> RaffleResult<Vec<Invoice>> {
        let filter = TenantFilter::read(ctx)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM invoice \
                 WHERE {} AND ambassador_id = $ambassador_id \
                 ORDER BY created_at ASC",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("ambassador_id", ambassador_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvoiceRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_invoices(rows)?)
    }

    async fn list_by_referrals(
        &self,
        ctx: &TenantContext,
        referral_ids: &[Uuid],
    ) -> RaffleResult<Vec<Invoice>> {
        if referral_ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = TenantFilter::read(ctx)?;
        let ids: Vec<String> = referral_ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM invoice \
                 WHERE {} AND referral_id IN $referral_ids \
                 ORDER BY created_at ASC",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("referral_ids", ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvoiceRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_invoices(rows)?)
    }
}
