//! Opening the platform database.
//!
//! Production runs against a SurrealDB server over WebSocket; tests build an
//! in-memory `Surreal<Db>` directly and hand it to the repositories.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Where the raffle data lives and how to sign in.
///
/// Deserialized from the `database` section of the server configuration;
/// missing keys fall back to a local development server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// `host:port` of the SurrealDB WebSocket endpoint.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "raffle".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Shared handle to the raffle database. Cloning is cheap; every
/// repository gets its own clone of [`DbManager::client`].
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Open the WebSocket connection, sign in as root and select the
    /// configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Opening raffle database"
        );

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        info!("Raffle database ready");
        Ok(Self { db })
    }

    /// Bring the schema up to [`crate::latest_version`].
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.db).await
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
