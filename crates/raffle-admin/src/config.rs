//! Admin service configuration.

use serde::Deserialize;

/// Configuration for the admin services.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Public base URL of the storefront, without a trailing slash.
    /// Referral links and verification routes are built from it.
    pub base_url: String,
    /// Timeout for verification notification requests in seconds.
    pub notify_timeout_secs: u64,
    /// Upper bound for a single number generation request.
    pub max_generate_quantity: u64,
}

impl AdminConfig {
    /// `base_url` with any trailing slashes removed.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            notify_timeout_secs: 10,
            max_generate_quantity: 10_000,
        }
    }
}
