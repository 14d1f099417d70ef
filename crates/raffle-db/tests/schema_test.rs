//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use surrealdb_types::SurrealValue;

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    raffle_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "tenant",
        "ambassador",
        "referral",
        "raffle",
        "ticket_package",
        "raffle_number_assignment",
        "participant",
        "invoice",
        "raffle_entry",
        "payment_config",
        "email_config",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn schema_migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    raffle_db::run_migrations(&db).await.unwrap();
    raffle_db::run_migrations(&db).await.unwrap();

    let mut result = db
        .query("SELECT count() AS total FROM _migration GROUP ALL")
        .await
        .unwrap();
    let rows: Vec<CountRow> = result.take(0).unwrap();
    assert_eq!(rows[0].total, u64::from(raffle_db::latest_version()));
}
