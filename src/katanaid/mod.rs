//! Client-side trust and session-guard layer for the KatanaID API.
//!
//! Component overview (leaves first):
//! - `session`: the shared `{token, user}` store.
//! - `middleware` + `transport`: request pipeline with bearer injection and
//!   401 teardown.
//! - `fingerprint` + `trust`: device signals and risk scoring.
//! - `guard` + `contact`: duplicate-submission protection for sensitive forms.
//! - `gate`: verification overlay derived from the session.

pub mod auth;
pub mod config;
pub mod contact;
pub mod dashboard;
pub mod errors;
pub mod fingerprint;
pub mod gate;
pub mod guard;
pub mod health;
pub mod middleware;
pub mod navigation;
pub mod session;
pub mod transport;
pub mod trust;

use std::sync::Arc;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Wires one session store, transport and trust collector together.
#[derive(Clone, Debug)]
pub struct KatanaClient {
    config: config::ClientConfig,
    session: session::SessionStore,
    api: transport::ApiClient,
    trust: trust::TrustScoreCollector,
}

impl KatanaClient {
    /// # Errors
    /// Returns `AppError::Config` if the configuration is invalid.
    pub fn new(
        config: config::ClientConfig,
        navigator: Arc<dyn navigation::Navigator>,
    ) -> Result<Self, errors::AppError> {
        let session = session::SessionStore::new();
        let api = transport::ApiClient::new(&config, session.clone(), navigator)?;
        let trust = trust::TrustScoreCollector::new(api.clone());
        Ok(Self {
            config,
            session,
            api,
            trust,
        })
    }

    /// Builds a client from `ClientConfig::load`.
    ///
    /// # Errors
    /// Returns `AppError::Config` if a `KATANAID_*` override is invalid.
    pub fn from_env(navigator: Arc<dyn navigation::Navigator>) -> Result<Self, errors::AppError> {
        Self::new(config::ClientConfig::load()?, navigator)
    }

    #[must_use]
    pub const fn config(&self) -> &config::ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn session(&self) -> &session::SessionStore {
        &self.session
    }

    #[must_use]
    pub const fn api(&self) -> &transport::ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn trust(&self) -> &trust::TrustScoreCollector {
        &self.trust
    }

    /// A contact dialog with its own guard, using the configured cooldown.
    #[must_use]
    pub fn contact_dialog(&self) -> contact::ContactDialog {
        contact::ContactDialog::new(self.api.clone(), self.config.cooldown)
    }

    #[must_use]
    pub fn verification_gate(&self) -> gate::VerificationGate {
        gate::VerificationGate::new(&self.session)
    }
}
