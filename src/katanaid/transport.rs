//! Authenticated transport for the KatanaID API.
//!
//! Every outbound call goes through `ApiClient::send`, which runs the
//! middleware chain, issues the request with the configured timeout, and maps
//! the response status into `AppError`. There are no retries, no queueing and
//! no token refresh: a 401 is terminal for the current session.

use super::{
    config::ClientConfig,
    errors::AppError,
    middleware::{ApiRequest, ApiResponse, MiddlewareChain},
    navigation::Navigator,
    session::SessionStore,
    APP_USER_AGENT,
};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    chain: MiddlewareChain,
}

impl ApiClient {
    /// Builds a client with the default authenticated middleware chain.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the configuration is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(
        config: &ClientConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AppError> {
        let chain = MiddlewareChain::authenticated(&session, navigator, &config.login_path);
        Self::with_chain(config, session, chain)
    }

    /// Builds a client with an explicit middleware chain.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the configuration is invalid or the HTTP
    /// client cannot be constructed.
    pub fn with_chain(
        config: &ClientConfig,
        session: SessionStore,
        chain: MiddlewareChain,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base_url.clone(),
                session,
                chain,
            }),
        })
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        build_url_with_base(&self.inner.base_url, path)
    }

    /// Issues `method path` with an optional JSON body.
    ///
    /// # Errors
    /// `AppError::Unauthorized` on 401 (after the session is cleared),
    /// `AppError::RateLimited` on 429, `AppError::Http` on any other non-2xx,
    /// and `Network`/`Timeout` when the server cannot be reached.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, AppError> {
        self.send(ApiRequest::new(method, path).with_body(body))
            .await
    }

    /// Sends a prepared request through the middleware chain.
    ///
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AppError> {
        let request = self.inner.chain.apply_request(request);
        let url = self.endpoint_url(&request.path);
        debug!(method = %request.method, url = %url, "api request");

        let mut builder = self
            .inner
            .http
            .request(request.method, &url)
            .headers(request.headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_request_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        // Error statuses must reach the response chain even with a broken body.
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) if !status.is_success() => {
                debug!(status = status.as_u16(), error = %err, "failed to read error body");
                String::new()
            }
            Err(err) => return Err(map_request_error(err)),
        };
        debug!(status = status.as_u16(), url = %url, "api response");

        let response = self.inner.chain.apply_response(ApiResponse {
            status,
            headers,
            body,
        });

        check_status(response)
    }

    /// GETs `path` with query parameters and decodes the JSON body.
    ///
    /// # Errors
    /// See [`ApiClient::request`]; `AppError::Parse` if the body is not `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let request = query.iter().fold(
            ApiRequest::new(Method::GET, path),
            |request, (key, value)| request.with_query(*key, *value),
        );
        decode_json(&self.send(request).await?)
    }

    /// POSTs a JSON body and decodes the JSON response.
    ///
    /// # Errors
    /// See [`ApiClient::request`]; `AppError::Serialization` if `body` cannot
    /// be encoded and `AppError::Parse` if the response is not `T`.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = self
            .request(Method::POST, path, Some(encode_body(body)?))
            .await?;
        decode_json(&response)
    }

    /// POSTs a JSON body and ignores the response body.
    ///
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn post_json_discard<B: Serialize>(&self, path: &str, body: &B) -> Result<(), AppError> {
        self.request(Method::POST, path, Some(encode_body(body)?))
            .await
            .map(|_| ())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

fn encode_body<B: Serialize>(body: &B) -> Result<Value, AppError> {
    serde_json::to_value(body)
        .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))
}

fn decode_json<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, AppError> {
    serde_json::from_str(&response.body)
        .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps network errors into `AppError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        AppError::Serialization(format!("Failed to build request: {err}"))
    } else if err.is_decode() {
        AppError::Parse(format!("Failed to read response: {err}"))
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Turns non-2xx responses into typed errors; 2xx passes through.
fn check_status(response: ApiResponse) -> Result<ApiResponse, AppError> {
    if response.status.is_success() {
        return Ok(response);
    }
    let message = server_message(&response.body);
    Err(match response.status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimited { message },
        status => AppError::Http {
            status: status.as_u16(),
            message,
        },
    })
}

/// Extracts the server-provided message: the `error` (or `message`) field of a
/// JSON body, or the sanitized body text when it is not JSON.
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => ["error", "message"]
            .iter()
            .find_map(|key| json.get(key).and_then(Value::as_str))
            .and_then(sanitize_body),
        Err(_) => sanitize_body(trimmed),
    }
}

/// Trims and truncates error text for user-facing messages.
fn sanitize_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_CHARS).collect())
    }
}
