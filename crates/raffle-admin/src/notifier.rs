//! Verification notifications for newly registered affiliates.
//!
//! The storefront owns the actual email delivery; this side only asks it to
//! send one by POSTing to `{base_url}/api/{ambassadors|referrals}/send-verification`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::error::AdminError;

/// Which affiliate table a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffiliateKind {
    Ambassador,
    Referral,
}

impl AffiliateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ambassador => "ambassador",
            Self::Referral => "referral",
        }
    }

    fn api_segment(&self) -> &'static str {
        match self {
            Self::Ambassador => "ambassadors",
            Self::Referral => "referrals",
        }
    }
}

/// JSON body of a verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Referral link carrying the affiliate's code.
    pub link: String,
    /// Page that confirms the affiliate's email address.
    pub verify_url: String,
}

impl VerificationRequest {
    pub fn new(base_url: &str, kind: AffiliateKind, id: Uuid, tenant_id: Uuid, code: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            id,
            tenant_id,
            link: format!("{base}/?ref={code}"),
            verify_url: format!("{base}/verify/{}/{id}", kind.as_str()),
        }
    }
}

/// Sends verification notifications.
pub trait VerificationNotifier: Send + Sync {
    fn send_verification(
        &self,
        kind: AffiliateKind,
        request: &VerificationRequest,
    ) -> impl Future<Output = Result<(), AdminError>> + Send;
}

/// Notifier calling the storefront's verification endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpVerificationNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVerificationNotifier {
    pub fn new(config: &AdminConfig) -> Result<Self, AdminError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.notify_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base().to_string(),
        })
    }

    pub fn endpoint(&self, kind: AffiliateKind) -> String {
        format!("{}/api/{}/send-verification", self.base_url, kind.api_segment())
    }
}

impl VerificationNotifier for HttpVerificationNotifier {
    async fn send_verification(
        &self,
        kind: AffiliateKind,
        request: &VerificationRequest,
    ) -> Result<(), AdminError> {
        let url = self.endpoint(kind);
        debug!(%url, id = %request.id, "Sending verification request");

        self.client
            .post(&url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// In-memory notifier for tests and development; records every request.
#[derive(Debug, Clone, Default)]
pub struct MemoryVerificationNotifier {
    sent: Arc<Mutex<Vec<(AffiliateKind, VerificationRequest)>>>,
    fail: bool,
}

impl MemoryVerificationNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every send fails, still recording the attempt.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<(AffiliateKind, VerificationRequest)> {
        self.sent.lock().await.clone()
    }
}

impl VerificationNotifier for MemoryVerificationNotifier {
    async fn send_verification(
        &self,
        kind: AffiliateKind,
        request: &VerificationRequest,
    ) -> Result<(), AdminError> {
        self.sent.lock().await.push((kind, request.clone()));
        if self.fail {
            return Err(AdminError::Notification("memory notifier set to fail".into()));
        }
        Ok(())
    }
}
