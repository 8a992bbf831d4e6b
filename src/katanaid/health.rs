use super::{errors::AppError, transport::ApiClient};
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub const HEALTH_PATH: &str = "/health";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthResponse {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok") || self.status.eq_ignore_ascii_case("healthy")
    }
}

/// # Errors
/// Any transport error from the probe.
#[instrument(skip(client))]
pub async fn check(client: &ApiClient) -> Result<HealthResponse, AppError> {
    client.get_json(HEALTH_PATH, &[]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::katanaid::{config::ClientConfig, navigation::NoopNavigator, session::SessionStore};
    use serde_json::json;
    use std::{net::TcpListener, sync::Arc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn healthy_status_values() {
        let ok = HealthResponse {
            status: "ok".to_string(),
            timestamp: None,
        };
        assert!(ok.is_healthy());
        let degraded = HealthResponse {
            status: "degraded".to_string(),
            timestamp: None,
        };
        assert!(!degraded.is_healthy());
    }

    #[tokio::test]
    async fn check_decodes_status_document() -> anyhow::Result<()> {
        if TcpListener::bind("127.0.0.1:0").is_err() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(HEALTH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "timestamp": "2026-10-16T09:00:00Z"
            })))
            .mount(&server)
            .await;

        let config = ClientConfig::default().with_api_base_url(server.uri());
        let client = ApiClient::new(&config, SessionStore::new(), Arc::new(NoopNavigator))?;
        let health = check(&client).await?;
        assert!(health.is_healthy());
        assert_eq!(health.timestamp.as_deref(), Some("2026-10-16T09:00:00Z"));
        Ok(())
    }
}
