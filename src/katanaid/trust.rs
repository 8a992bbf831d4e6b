//! Trust score collection. `check_trust` asks the scoring service for a risk
//! decision before a sensitive action; `record_fingerprint` is best-effort
//! telemetry that runs on a detached task and never reports failure to the
//! caller. Delivery of recorded fingerprints is at-most-once: there is no
//! retry and no offline buffer.
//!
//! The returned `Recommendation` is authoritative. Callers map it to a
//! `Directive` and act on it without reinterpreting the score.

use super::{
    errors::AppError,
    fingerprint::{FingerprintData, FingerprintSource, SystemFingerprint},
    transport::ApiClient,
    APP_USER_AGENT,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, instrument, warn};

pub const TRUST_SCORE_PATH: &str = "/api/trust/score";
pub const TRUST_RECORD_PATH: &str = "/api/trust/record";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Allow,
    Captcha,
    Block,
}

/// What the caller must do with the guarded action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    Proceed,
    Challenge,
    Refuse,
}

impl Recommendation {
    #[must_use]
    pub const fn directive(self) -> Directive {
        match self {
            Self::Allow => Directive::Proceed,
            Self::Captcha => Directive::Challenge,
            Self::Block => Directive::Refuse,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub score: f64,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustScoreResult {
    pub score: f64,
    #[serde(default)]
    pub signals: Vec<Signal>,
    pub recommendation: Recommendation,
    pub fingerprint_id: String,
}

impl TrustScoreResult {
    #[must_use]
    pub const fn directive(&self) -> Directive {
        self.recommendation.directive()
    }
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    fingerprint: &'a FingerprintData,
    email: &'a str,
}

#[derive(Serialize)]
struct RecordRequest {
    fingerprint: FingerprintData,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<i64>,
}

#[derive(Clone)]
pub struct TrustScoreCollector {
    client: ApiClient,
    source: Arc<dyn FingerprintSource>,
    last: Arc<Mutex<Option<FingerprintData>>>,
}

impl TrustScoreCollector {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self::with_source(client, Arc::new(SystemFingerprint::new(APP_USER_AGENT)))
    }

    #[must_use]
    pub fn with_source(client: ApiClient, source: Arc<dyn FingerprintSource>) -> Self {
        Self {
            client,
            source,
            last: Arc::new(Mutex::new(None)),
        }
    }

    /// Last fingerprint collected by `check_trust`, if any.
    #[must_use]
    pub fn last_fingerprint(&self) -> Option<FingerprintData> {
        self.last.lock().clone()
    }

    /// Collects a fresh fingerprint and asks the scoring service about
    /// `email`. The fingerprint stays cached even if the call fails.
    ///
    /// # Errors
    /// Any transport error from the scoring call.
    #[instrument(skip_all)]
    pub async fn check_trust(&self, email: &str) -> Result<TrustScoreResult, AppError> {
        let fingerprint = self.source.collect();
        *self.last.lock() = Some(fingerprint.clone());

        let result: TrustScoreResult = self
            .client
            .post_json(
                TRUST_SCORE_PATH,
                &ScoreRequest {
                    fingerprint: &fingerprint,
                    email,
                },
            )
            .await?;

        debug!(
            score = result.score,
            recommendation = ?result.recommendation,
            signals = result.signals.len(),
            "trust score received"
        );
        Ok(result)
    }

    /// Records the current fingerprint for `user_id` on a detached task.
    ///
    /// Reuses the fingerprint cached by `check_trust` when there is one. The
    /// returned handle resolves to `()` whatever happens to the request;
    /// dropping it does not cancel delivery. Returns `None` without sending
    /// anything when called outside a Tokio runtime.
    pub fn record_fingerprint(&self, user_id: Option<i64>) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime, fingerprint not recorded");
            return None;
        };
        let cached = self.last.lock().clone();
        let fingerprint = cached.unwrap_or_else(|| self.source.collect());
        let client = self.client.clone();

        Some(runtime.spawn(async move {
            let request = RecordRequest {
                fingerprint,
                user_id,
            };
            if let Err(err) = client.post_json_discard(TRUST_RECORD_PATH, &request).await {
                warn!(error = %err, "Failed to record fingerprint");
            }
        }))
    }
}

impl std::fmt::Debug for TrustScoreCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustScoreCollector")
            .field("client", &self.client)
            .field("has_fingerprint", &self.last.lock().is_some())
            .finish_non_exhaustive()
    }
}
