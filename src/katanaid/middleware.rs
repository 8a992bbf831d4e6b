//! Request/response middleware composed around the base HTTP call.
//!
//! Flow Overview:
//! - Request middleware runs in registration order before the request is sent
//!   (`RequestId`, then `BearerAuth` in the default chain).
//! - Response middleware runs in registration order on every response,
//!   successful or not (`UnauthorizedTeardown` in the default chain).
//! - Status interpretation happens afterwards in the transport, so a 401 has
//!   already cleared the session by the time the caller sees `Unauthorized`.
//!
//! Security boundary: `BearerAuth` is the only place the session token is
//! exposed, and the header it writes is marked sensitive.

use super::{
    navigation::{Navigation, Navigator},
    session::SessionStore,
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    Method, StatusCode,
};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Outbound request before it is turned into a `reqwest` call.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Inbound response with the body already read.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

pub trait RequestMiddleware: Send + Sync {
    fn on_request(&self, request: ApiRequest) -> ApiRequest;
}

pub trait ResponseMiddleware: Send + Sync {
    fn on_response(&self, response: ApiResponse) -> ApiResponse;
}

/// Attaches `Authorization: Bearer <token>` when the session holds a token.
pub struct BearerAuth {
    session: SessionStore,
}

impl BearerAuth {
    #[must_use]
    pub const fn new(session: SessionStore) -> Self {
        Self { session }
    }
}

impl RequestMiddleware for BearerAuth {
    fn on_request(&self, mut request: ApiRequest) -> ApiRequest {
        let session = self.session.get();
        let Some(token) = session.token() else {
            return request;
        };
        let token = token.expose_secret();
        if token.is_empty() {
            return request;
        }
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("session token is not a valid header value, sending unauthenticated"),
        }
        request
    }
}

/// Tags each request with a time-ordered id for log correlation.
#[derive(Clone, Debug, Default)]
pub struct RequestId;

impl RequestMiddleware for RequestId {
    fn on_request(&self, mut request: ApiRequest) -> ApiRequest {
        let name = HeaderName::from_static(REQUEST_ID_HEADER);
        if !request.headers.contains_key(&name) {
            if let Ok(value) = HeaderValue::from_str(&uuid::Uuid::now_v7().to_string()) {
                request.headers.insert(name, value);
            }
        }
        request
    }
}

/// Clears the session and redirects to login on any 401.
pub struct UnauthorizedTeardown {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl UnauthorizedTeardown {
    #[must_use]
    pub fn new(
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            session,
            navigator,
            login_path: login_path.into(),
        }
    }
}

impl ResponseMiddleware for UnauthorizedTeardown {
    fn on_response(&self, response: ApiResponse) -> ApiResponse {
        if response.status == StatusCode::UNAUTHORIZED {
            warn!("User is not authorized, clearing session");
            self.session.clear();
            self.navigator.navigate(Navigation::Login {
                path: self.login_path.clone(),
            });
        }
        response
    }
}

/// Ordered request and response transforms.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    request: Vec<Arc<dyn RequestMiddleware>>,
    response: Vec<Arc<dyn ResponseMiddleware>>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain every authenticated client uses: request id, bearer token,
    /// and 401 teardown.
    #[must_use]
    pub fn authenticated(
        session: &SessionStore,
        navigator: Arc<dyn Navigator>,
        login_path: &str,
    ) -> Self {
        Self::new()
            .with_request(RequestId)
            .with_request(BearerAuth::new(session.clone()))
            .with_response(UnauthorizedTeardown::new(
                session.clone(),
                navigator,
                login_path,
            ))
    }

    #[must_use]
    pub fn with_request(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.request.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn with_response(mut self, middleware: impl ResponseMiddleware + 'static) -> Self {
        self.response.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn apply_request(&self, request: ApiRequest) -> ApiRequest {
        self.request
            .iter()
            .fold(request, |request, middleware| middleware.on_request(request))
    }

    #[must_use]
    pub fn apply_response(&self, response: ApiResponse) -> ApiResponse {
        self.response
            .iter()
            .fold(response, |response, middleware| middleware.on_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::katanaid::{
        navigation::ChannelNavigator,
        session::{Session, UserProfile},
    };

    fn response(status: StatusCode) -> ApiResponse {
        ApiResponse {
            status,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    fn signed_in() -> SessionStore {
        SessionStore::with_session(Session::authenticated(
            "jwt-abc",
            UserProfile {
                id: Some(1),
                username: "ronin".to_string(),
                email: "ronin@katanaid.dev".to_string(),
                email_verified: true,
            },
        ))
    }

    #[test]
    fn bearer_auth_injects_token() {
        let request = BearerAuth::new(signed_in()).on_request(ApiRequest::new(Method::GET, "/x"));
        let value = request.headers.get(AUTHORIZATION).expect("header set");
        assert_eq!(value.to_str().ok(), Some("Bearer jwt-abc"));
        assert!(value.is_sensitive());
    }

    #[test]
    fn bearer_auth_skips_without_token() {
        let request =
            BearerAuth::new(SessionStore::new()).on_request(ApiRequest::new(Method::GET, "/x"));
        assert!(request.headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn request_id_is_added_once() {
        let request = RequestId.on_request(ApiRequest::new(Method::GET, "/x"));
        let first = request.headers.get(REQUEST_ID_HEADER).cloned();
        assert!(first.is_some());

        let request = RequestId.on_request(request);
        assert_eq!(request.headers.get(REQUEST_ID_HEADER).cloned(), first);
    }

    #[test]
    fn teardown_clears_session_and_navigates_on_401() {
        let session = signed_in();
        let (navigator, mut rx) = ChannelNavigator::new();
        let teardown = UnauthorizedTeardown::new(session.clone(), Arc::new(navigator), "/login");

        let out = teardown.on_response(response(StatusCode::UNAUTHORIZED));

        assert_eq!(out.status, StatusCode::UNAUTHORIZED);
        assert!(session.get().is_empty());
        assert_eq!(
            rx.try_recv().ok(),
            Some(Navigation::Login {
                path: "/login".to_string()
            })
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn teardown_ignores_other_statuses() {
        let session = signed_in();
        let (navigator, mut rx) = ChannelNavigator::new();
        let teardown = UnauthorizedTeardown::new(session.clone(), Arc::new(navigator), "/login");

        for status in [
            StatusCode::OK,
            StatusCode::FORBIDDEN,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            teardown.on_response(response(status));
        }

        assert!(session.get().has_token());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn chain_applies_middleware_in_order() {
        struct Tag(&'static str);
        impl RequestMiddleware for Tag {
            fn on_request(&self, mut request: ApiRequest) -> ApiRequest {
                request.path.push_str(self.0);
                request
            }
        }

        let chain = MiddlewareChain::new().with_request(Tag("/a")).with_request(Tag("/b"));
        let request = chain.apply_request(ApiRequest::new(Method::GET, "/root"));
        assert_eq!(request.path, "/root/a/b");
    }
}
