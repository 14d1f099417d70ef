//! SurrealDB implementation of [`RaffleEntryRepository`].
//!
//! Entries carry no `tenant_id`; every statement is keyed by `raffle_id`.

use chrono::{DateTime, Utc};
use raffle_core::error::RaffleResult;
use raffle_core::models::raffle_entry::{CreateRaffleEntry, RaffleEntry};
use raffle_core::ranges::NumberRange;
use raffle_core::repository::{PaginatedResult, Pagination, RaffleEntryRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{CountRow, RECORD_FIELDS, first_or_not_found, parse_opt_uuid, parse_uuid, total};

#[derive(Debug, SurrealValue)]
struct EntryRow {
    record_id: String,
    raffle_id: String,
    participant_id: String,
    invoice_id: Option<String>,
    ticket_number: u64,
    is_winner: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TicketNumberRow {
    ticket_number: u64,
}

impl EntryRow {
    fn try_into_entry(self) -> Result<RaffleEntry, DbError> {
        Ok(RaffleEntry {
            id: parse_uuid(&self.record_id, "raffle_entry")?,
            raffle_id: parse_uuid(&self.raffle_id, "raffle")?,
            participant_id: parse_uuid(&self.participant_id, "participant")?,
            invoice_id: parse_opt_uuid(self.invoice_id, "invoice")?,
            ticket_number: self.ticket_number,
            is_winner: self.is_winner,
            created_at: self.created_at,
        })
    }
}

fn into_entries(rows: Vec<EntryRow>) -> Result<Vec<RaffleEntry>, DbError> {
    rows.into_iter().map(|row| row.try_into_entry()).collect()
}

/// SurrealDB implementation of the RaffleEntry repository.
#[derive(Clone)]
pub struct SurrealRaffleEntryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRaffleEntryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Set `is_winner` on one entry of the raffle, optionally clearing the
    /// flag on every other entry first.
    async fn mark(
        &self,
        raffle_id: Uuid,
        id: Uuid,
        is_winner: bool,
        clear_others: bool,
    ) -> RaffleResult<RaffleEntry> {
        // NotFound for ids of another raffle.
        self.get_by_id(raffle_id, id).await?;
        let id_str = id.to_string();

        let clear = if clear_others {
            "UPDATE raffle_entry SET is_winner = false \
             WHERE raffle_id = $raffle_id AND is_winner = true RETURN NONE;"
        } else {
            ""
        };

        let result = self
            .db
            .query(format!(
                "BEGIN TRANSACTION; \
                 {clear} \
                 UPDATE type::record('raffle_entry', $id) SET is_winner = $is_winner \
                 RETURN NONE; \
                 COMMIT TRANSACTION;"
            ))
            .bind(("id", id_str.clone()))
            .bind(("raffle_id", raffle_id.to_string()))
            .bind(("is_winner", is_winner))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_statement("raffle_entry", e))?;

        self.get_by_id(raffle_id, id).await
    }
}

impl<C: Connection> RaffleEntryRepository for SurrealRaffleEntryRepository<C> {
    async fn create(&self, input: CreateRaffleEntry) -> RaffleResult<RaffleEntry> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(format!(
                "CREATE type::record('raffle_entry', $id) SET \
                 raffle_id = $raffle_id, participant_id = $participant_id, \
                 invoice_id = $invoice_id, ticket_number = $ticket_number \
                 RETURN NONE; \
                 SELECT {RECORD_FIELDS} FROM type::record('raffle_entry', $id);"
            ))
            .bind(("id", id_str.clone()))
            .bind(("raffle_id", input.raffle_id.to_string()))
            .bind(("participant_id", input.participant_id.to_string()))
            .bind(("invoice_id", input.invoice_id.map(|id| id.to_string())))
            .bind(("ticket_number", input.ticket_number))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("raffle_entry", e))?;

        let rows: Vec<EntryRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "raffle_entry", id_str)?.try_into_entry()?)
    }

    async fn get_by_id(&self, raffle_id: Uuid, id: Uuid) -> RaffleResult<RaffleEntry> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::record('raffle_entry', $id) \
                 WHERE raffle_id = $raffle_id"
            ))
            .bind(("id", id_str.clone()))
            .bind(("raffle_id", raffle_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EntryRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "raffle_entry", id_str)?.try_into_entry()?)
    }

    async fn list_by_raffle(
        &self,
        raffle_id: Uuid,
        pagination: Pagination,
    ) -> RaffleResult<PaginatedResult<RaffleEntry>> {
        let total_count = self.count(raffle_id, None).await?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM raffle_entry \
                 WHERE raffle_id = $raffle_id \
                 ORDER BY ticket_number ASC LIMIT $limit START $offset"
            ))
            .bind(("raffle_id", raffle_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EntryRow> = result.take(0).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: into_entries(rows)?,
            total: total_count,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_participant(
        &self,
        raffle_id: Uuid,
        participant_id: Uuid,
    ) -> RaffleResult<Vec<RaffleEntry>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM raffle_entry \
                 WHERE raffle_id = $raffle_id AND participant_id = $participant_id \
                 ORDER BY ticket_number ASC"
            ))
            .bind(("raffle_id", raffle_id.to_string()))
            .bind(("participant_id", participant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EntryRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_entries(rows)?)
    }

    async fn ticket_numbers(&self, raffle_id: Uuid) -> RaffleResult<Vec<u64>> {
        let mut result = self
            .db
            .query(
                "SELECT ticket_number FROM raffle_entry \
                 WHERE raffle_id = $raffle_id ORDER BY ticket_number ASC",
            )
            .bind(("raffle_id", raffle_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TicketNumberRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(|r| r.ticket_number).collect())
    }

    async fn count(&self, raffle_id: Uuid, range: Option<NumberRange>) -> RaffleResult<u64> {
        let range_clause = if range.is_some() {
            " AND ticket_number >= $start AND ticket_number <= $end"
        } else {
            ""
        };

        let mut result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM raffle_entry \
                 WHERE raffle_id = $raffle_id{range_clause} GROUP ALL"
            ))
            .bind(("raffle_id", raffle_id.to_string()))
            .bind(("start", range.map(|r| r.start)))
            .bind(("end", range.map(|r| r.end)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(total(rows))
    }

    async fn nth(&self, raffle_id: Uuid, index: u64) -> RaffleResult<RaffleEntry> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM raffle_entry \
                 WHERE raffle_id = $raffle_id \
                 ORDER BY ticket_number ASC LIMIT 1 START $index"
            ))
            .bind(("raffle_id", raffle_id.to_string()))
            .bind(("index", index))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EntryRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_or_not_found(rows, "raffle_entry", format!("{raffle_id}#{index}"))?
            .try_into_entry()?)
    }

    async fn set_winner(&self, raffle_id: Uuid, id: Uuid) -> RaffleResult<RaffleEntry> {
        self.mark(raffle_id, id, true, true).await
    }

    async fn clear_winner(&self, raffle_id: Uuid, id: Uuid) -> RaffleResult<RaffleEntry> {
        self.mark(raffle_id, id, false, false).await
    }

    async fn get_winner(&self, raffle_id: Uuid) -> RaffleResult<Option<RaffleEntry>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM raffle_entry \
                 WHERE raffle_id = $raffle_id AND is_winner = true LIMIT 1"
            ))
            .bind(("raffle_id", raffle_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EntryRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.try_into_entry())
            .transpose()?)
    }
}
