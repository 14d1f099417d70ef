//! Raffle admin platform: application entry point.

mod settings;

use std::process::ExitCode;

use raffle_admin::HttpVerificationNotifier;
use raffle_db::{DbManager, latest_version};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::settings::AppConfig;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("raffle=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    info!(base_url = %config.admin.base(), "Configuration loaded");

    let db = DbManager::connect(&config.database).await?;
    db.migrate().await?;
    info!(schema_version = latest_version(), "Database ready");

    let notifier = HttpVerificationNotifier::new(&config.admin)?;
    info!(
        ambassadors = %notifier.endpoint(raffle_admin::AffiliateKind::Ambassador),
        referrals = %notifier.endpoint(raffle_admin::AffiliateKind::Referral),
        "Verification notifier configured"
    );

    info!("Raffle server started, waiting for shutdown signal");
    tokio::signal::ctrl_c().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    info!("Starting raffle server...");

    match run().await {
        Ok(()) => {
            info!("Raffle server stopped.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Raffle server failed");
            ExitCode::FAILURE
        }
    }
}
