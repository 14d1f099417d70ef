//! SurrealDB implementation of [`TicketPackageRepository`].

use chrono::{DateTime, Utc};
use raffle_core::context::TenantContext;
use raffle_core::error::RaffleResult;
use raffle_core::models::ticket_package::{
    CreateTicketPackage, PromotionType, TicketPackage, UpdateTicketPackage,
};
use raffle_core::repository::TicketPackageRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{RECORD_FIELDS, first_or_not_found, parse_uuid};
use crate::scope::TenantFilter;

#[derive(Debug, SurrealValue)]
struct TicketPackageRow {
    record_id: String,
    tenant_id: String,
    raffle_id: String,
    name: String,
    amount: u32,
    base_price: f64,
    promotion_type: String,
    promotion_value: f64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_promotion(s: &str) -> Result<PromotionType, DbError> {
    match s {
        "None" => Ok(PromotionType::None),
        "Discount" => Ok(PromotionType::Discount),
        "Bonus" => Ok(PromotionType::Bonus),
        "TwoForOne" => Ok(PromotionType::TwoForOne),
        "ThreeForTwo" => Ok(PromotionType::ThreeForTwo),
        other => Err(DbError::Decode(format!("unknown promotion type: {other}"))),
    }
}

fn promotion_to_string(p: PromotionType) -> &'static str {
    match p {
        PromotionType::None => "None",
        PromotionType::Discount => "Discount",
        PromotionType::Bonus => "Bonus",
        PromotionType::TwoForOne => "TwoForOne",
        PromotionType::ThreeForTwo => "ThreeForTwo",
    }
}

impl TicketPackageRow {
    fn try_into_package(self) -> Result<TicketPackage, DbError> {
        Ok(TicketPackage {
            id: parse_uuid(&self.record_id, "ticket_package")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            raffle_id: parse_uuid(&self.raffle_id, "raffle")?,
            name: self.name,
            amount: self.amount,
            base_price: self.base_price,
            promotion_type: parse_promotion(&self.promotion_type)?,
            promotion_value: self.promotion_value,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the TicketPackage repository.
#[derive(Clone)]
pub struct SurrealTicketPackageRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTicketPackageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TicketPackageRepository for SurrealTicketPackageRepository<C> {
    async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateTicketPackage,
    ) -> RaffleResult<TicketPackage> {
        let filter = TenantFilter::write(ctx)?;
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(format!(
                "CREATE type::record('ticket_package', $id) SET \
                 tenant_id = $tenant_id, raffle_id = $raffle_id, name = $name, \
                 amount = $amount, base_price = $base_price, \
                 promotion_type = $promotion_type, \
                 promotion_value = $promotion_value RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('ticket_package', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .bind(("raffle_id", input.raffle_id.to_string()))
            .bind(("name", input.name))
            .bind(("amount", input.amount))
            .bind(("base_price", input.base_price))
            .bind((
                "promotion_type",
                promotion_to_string(input.promotion_type).to_string(),
            ))
            .bind(("promotion_value", input.promotion_value))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("ticket_package", e))?;

        let rows: Vec<TicketPackageRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "ticket_package", id_str)?.try_into_package()?)
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<TicketPackage> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::record('ticket_package', $id) \
                 WHERE {}",
                filter.clause()
            ))
            .bind(("id", id_str.clone()))
            .bind(filter.binding())
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TicketPackageRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "ticket_package", id_str)?.try_into_package()?)
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateTicketPackage,
    ) -> RaffleResult<TicketPackage> {
        let filter = TenantFilter::read(ctx)?;
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.amount.is_some() {
            sets.push("amount = $amount");
        }
        if input.base_price.is_some() {
            sets.push("base_price = $base_price");
        }
        if input.promotion_type.is_some() {
            sets.push("promotion_type = $promotion_type");
        }
        if input.promotion_value.is_some() {
            sets.push("promotion_value = $promotion_value");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('ticket_package', $id) SET {} \
             WHERE {clause} RETURN NONE; \
             SELECT {RECORD_FIELDS} FROM type::record('ticket_package', $id) \
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
        if let Some(amount) = input.amount {
            builder = builder.bind(("amount", amount));
        }
        if let Some(base_price) = input.base_price {
            builder = builder.bind(("base_price", base_price));
        }
        if let Some(promotion_type) = input.promotion_type {
            builder = builder.bind((
                "promotion_type",
                promotion_to_string(promotion_type).to_string(),
            ));
        }
        if let Some(promotion_value) = input.promotion_value {
            builder = builder.bind(("promotion_value", promotion_value));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("ticket_package", e))?;

        let rows: Vec<TicketPackageRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "ticket_package", id_str)?.try_into_package()?)
    }

    async fn delete(&self, ctx: &TenantContext, id: Uuid) -> RaffleResult<()> {
        self.get_by_id(ctx, id).await?;

        self.db
            .query("DELETE type::record('ticket_package', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_raffle(
        &self,
        ctx: &TenantContext,
        raffle_id: Uuid,
    ) -> RaffleResult<Vec<TicketPackage>> {
        let filter = TenantFilter::read(ctx)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM ticket_package \
                 WHERE {} AND raffle_id = $raffle_id ORDER BY amount ASC",
                filter.clause()
            ))
            .bind(filter.binding())
            .bind(("raffle_id", raffle_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TicketPackageRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_package())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
