//! Environment configuration.
//!
//! Keys are read from `RAFFLE_*` variables with `__` between nesting
//! levels, e.g. `RAFFLE_DATABASE__URL` or `RAFFLE_ADMIN__BASE_URL`.
//! Anything unset keeps its default.

use config::{Config, Environment};
use raffle_admin::AdminConfig;
use raffle_db::DbConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RAFFLE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}
