//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "tenants_and_affiliates",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "raffles_and_sales",
        sql: SCHEMA_V2,
    },
    Migration {
        version: 3,
        name: "provider_configuration",
        sql: SCHEMA_V3,
    },
];

// -----------------------------------------------------------------------
// Schema v1: tenants, ambassadors, referrals
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD status ON TABLE tenant TYPE string \
    ASSERT $value IN ['Active', 'Suspended', 'Deleted'];
DEFINE FIELD plan ON TABLE tenant TYPE string \
    ASSERT $value IN ['Basic', 'Pro', 'Enterprise'];
DEFINE FIELD metadata ON TABLE tenant TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug UNIQUE;

-- =======================================================================
-- Ambassadors (tenant scope)
-- =======================================================================
DEFINE TABLE ambassador SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE ambassador TYPE string;
DEFINE FIELD name ON TABLE ambassador TYPE string;
DEFINE FIELD email ON TABLE ambassador TYPE string;
DEFINE FIELD phone ON TABLE ambassador TYPE option<string>;
DEFINE FIELD code ON TABLE ambassador TYPE string;
DEFINE FIELD commission_rate ON TABLE ambassador TYPE float \
    ASSERT $value >= 0 AND $value <= 1;
DEFINE FIELD team_commission_rate ON TABLE ambassador TYPE float \
    ASSERT $value >= 0 AND $value <= 1;
DEFINE FIELD is_active ON TABLE ambassador TYPE bool DEFAULT true;
DEFINE FIELD email_verified ON TABLE ambassador TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE ambassador TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE ambassador TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_ambassador_tenant_code ON TABLE ambassador \
    COLUMNS tenant_id, code UNIQUE;
DEFINE INDEX idx_ambassador_tenant_email ON TABLE ambassador \
    COLUMNS tenant_id, email UNIQUE;

-- =======================================================================
-- Referrals (tenant scope, optionally on an ambassador's team)
-- =======================================================================
DEFINE TABLE referral SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE referral TYPE string;
DEFINE FIELD ambassador_id ON TABLE referral TYPE option<string>;
DEFINE FIELD name ON TABLE referral TYPE string;
DEFINE FIELD email ON TABLE referral TYPE string;
DEFINE FIELD phone ON TABLE referral TYPE option<string>;
DEFINE FIELD code ON TABLE referral TYPE string;
DEFINE FIELD commission_rate ON TABLE referral TYPE float \
    ASSERT $value >= 0 AND $value <= 1;
DEFINE FIELD team_commission_rate ON TABLE referral TYPE float \
    ASSERT $value >= 0 AND $value <= 1;
DEFINE FIELD is_active ON TABLE referral TYPE bool DEFAULT true;
DEFINE FIELD email_verified ON TABLE referral TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE referral TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE referral TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_referral_tenant_code ON TABLE referral \
    COLUMNS tenant_id, code UNIQUE;
DEFINE INDEX idx_referral_tenant_email ON TABLE referral \
    COLUMNS tenant_id, email UNIQUE;
DEFINE INDEX idx_referral_ambassador ON TABLE referral \
    COLUMNS tenant_id, ambassador_id;
";

// -----------------------------------------------------------------------
// Schema v2: raffles, packages, number pools, participants, sales
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
-- =======================================================================
-- Raffles (tenant scope)
-- =======================================================================
DEFINE TABLE raffle SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE raffle TYPE string;
DEFINE FIELD title ON TABLE raffle TYPE string;
DEFINE FIELD description ON TABLE raffle TYPE string DEFAULT '';
DEFINE FIELD status ON TABLE raffle TYPE string \
    ASSERT $value IN ['Draft', 'Active', 'Paused', 'Completed'];
DEFINE FIELD total_numbers ON TABLE raffle TYPE int ASSERT $value >= 1;
DEFINE FIELD ticket_price ON TABLE raffle TYPE float ASSERT $value >= 0;
DEFINE FIELD draw_date ON TABLE raffle TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE raffle TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE raffle TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Ticket packages (tenant scope, per raffle)
-- =======================================================================
DEFINE TABLE ticket_package SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE ticket_package TYPE string;
DEFINE FIELD raffle_id ON TABLE ticket_package TYPE string;
DEFINE FIELD name ON TABLE ticket_package TYPE string;
DEFINE FIELD amount ON TABLE ticket_package TYPE int ASSERT $value >= 1;
DEFINE FIELD base_price ON TABLE ticket_package TYPE float \
    ASSERT $value >= 0;
DEFINE FIELD promotion_type ON TABLE ticket_package TYPE string \
    ASSERT $value IN ['None', 'Discount', 'Bonus', 'TwoForOne', \
    'ThreeForTwo'];
DEFINE FIELD promotion_value ON TABLE ticket_package TYPE float \
    ASSERT $value >= 0;
DEFINE FIELD is_active ON TABLE ticket_package TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE ticket_package TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE ticket_package TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_package_raffle ON TABLE ticket_package \
    COLUMNS tenant_id, raffle_id;

-- =======================================================================
-- Raffle number assignments / number pools (tenant scope, per raffle)
-- =======================================================================
DEFINE TABLE raffle_number_assignment SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE raffle_number_assignment TYPE string;
DEFINE FIELD raffle_id ON TABLE raffle_number_assignment TYPE string;
DEFINE FIELD holder_type ON TABLE raffle_number_assignment TYPE string \
    ASSERT $value IN ['Referral', 'Ambassador'];
DEFINE FIELD holder_id ON TABLE raffle_number_assignment TYPE string;
DEFINE FIELD range_start ON TABLE raffle_number_assignment TYPE int \
    ASSERT $value >= 1;
DEFINE FIELD range_end ON TABLE raffle_number_assignment TYPE int;
DEFINE FIELD status ON TABLE raffle_number_assignment TYPE string \
    ASSERT $value IN ['Assigned', 'Released'];
DEFINE FIELD created_at ON TABLE raffle_number_assignment TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE raffle_number_assignment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_assignment_raffle ON TABLE raffle_number_assignment \
    COLUMNS tenant_id, raffle_id, status;

-- =======================================================================
-- Participants (tenant scope)
-- =======================================================================
DEFINE TABLE participant SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE participant TYPE string;
DEFINE FIELD name ON TABLE participant TYPE string;
DEFINE FIELD email ON TABLE participant TYPE string;
DEFINE FIELD phone ON TABLE participant TYPE option<string>;
DEFINE FIELD created_at ON TABLE participant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_participant_tenant_email ON TABLE participant \
    COLUMNS tenant_id, email UNIQUE;

-- =======================================================================
-- Invoices (tenant scope)
-- =======================================================================
DEFINE TABLE invoice SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE invoice TYPE string;
DEFINE FIELD raffle_id ON TABLE invoice TYPE string;
DEFINE FIELD participant_id ON TABLE invoice TYPE string;
DEFINE FIELD package_id ON TABLE invoice TYPE option<string>;
DEFINE FIELD referral_id ON TABLE invoice TYPE option<string>;
DEFINE FIELD ambassador_id ON TABLE invoice TYPE option<string>;
DEFINE FIELD quantity ON TABLE invoice TYPE int ASSERT $value >= 1;
DEFINE FIELD total_price ON TABLE invoice TYPE float ASSERT $value >= 0;
DEFINE FIELD status ON TABLE invoice TYPE string \
    ASSERT $value IN ['Pending', 'Completed', 'Paid', 'Cancelled', \
    'Refunded'];
DEFINE FIELD created_at ON TABLE invoice TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE invoice TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_invoice_raffle ON TABLE invoice \
    COLUMNS tenant_id, raffle_id;
DEFINE INDEX idx_invoice_referral ON TABLE invoice \
    COLUMNS tenant_id, referral_id;
DEFINE INDEX idx_invoice_ambassador ON TABLE invoice \
    COLUMNS tenant_id, ambassador_id;

-- =======================================================================
-- Raffle entries (scoped through raffle_id, no tenant_id)
-- =======================================================================
DEFINE TABLE raffle_entry SCHEMAFULL;
DEFINE FIELD raffle_id ON TABLE raffle_entry TYPE string;
DEFINE FIELD participant_id ON TABLE raffle_entry TYPE string;
DEFINE FIELD invoice_id ON TABLE raffle_entry TYPE option<string>;
DEFINE FIELD ticket_number ON TABLE raffle_entry TYPE int \
    ASSERT $value >= 1;
DEFINE FIELD is_winner ON TABLE raffle_entry TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE raffle_entry TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_entry_raffle_number ON TABLE raffle_entry \
    COLUMNS raffle_id, ticket_number UNIQUE;
DEFINE INDEX idx_entry_raffle_participant ON TABLE raffle_entry \
    COLUMNS raffle_id, participant_id;
";

// -----------------------------------------------------------------------
// Schema v3: payment and email provider configuration
// -----------------------------------------------------------------------

const SCHEMA_V3: &str = "\
DEFINE TABLE payment_config SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE payment_config TYPE string;
DEFINE FIELD provider ON TABLE payment_config TYPE string \
    ASSERT $value IN ['Stripe', 'PayPal', 'MercadoPago', 'Manual'];
DEFINE FIELD public_key ON TABLE payment_config TYPE option<string>;
DEFINE FIELD secret_key ON TABLE payment_config TYPE option<string>;
DEFINE FIELD sandbox ON TABLE payment_config TYPE bool DEFAULT true;
DEFINE FIELD is_active ON TABLE payment_config TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE payment_config TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE payment_config TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_payment_config_provider ON TABLE payment_config \
    COLUMNS tenant_id, provider UNIQUE;

DEFINE TABLE email_config SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE email_config TYPE string;
DEFINE FIELD provider ON TABLE email_config TYPE string \
    ASSERT $value IN ['Resend', 'SendGrid', 'Smtp'];
DEFINE FIELD from_email ON TABLE email_config TYPE string;
DEFINE FIELD from_name ON TABLE email_config TYPE string;
DEFINE FIELD api_key ON TABLE email_config TYPE option<string>;
DEFINE FIELD is_active ON TABLE email_config TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE email_config TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE email_config TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_email_config_provider ON TABLE email_config \
    COLUMNS tenant_id, provider UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query(
            "CREATE _migration SET version = $version, \
             name = $name",
        )
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "Failed to record migration v{}: {}",
                migration.version, e,
            ))
        })?;

        info!(version = migration.version, "Migration applied successfully");
    }

    Ok(())
}

/// Latest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}
