//! Client configuration with environment overrides. Defaults target a local
//! API; `KATANAID_*` variables replace them when set to a non-blank value.
//! Configuration values are public; do not store secrets here.

use super::errors::AppError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
/// Default request timeout applied by the transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Default cooldown after a guarded form dispatch.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(3_000);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub login_path: String,
    pub request_timeout: Duration,
    pub cooldown: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

impl ClientConfig {
    /// Loads defaults and applies `KATANAID_*` environment overrides.
    ///
    /// Entry point for embedders, see `KatanaClient::from_env`. The CLI
    /// resolves the same variables through its own arguments instead.
    ///
    /// # Errors
    /// Returns `AppError::Config` if an override cannot be parsed or the
    /// resulting base URL is invalid.
    pub fn load() -> Result<Self, AppError> {
        let mut config = Self::default();
        apply_overrides(&mut config, Overrides::from_env())?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Checks that the base URL is an absolute http(s) URL.
    ///
    /// # Errors
    /// Returns `AppError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<(), AppError> {
        let url = Url::parse(self.api_base_url.trim())
            .map_err(|err| AppError::Config(format!("invalid API base URL: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "unsupported API URL scheme: {}",
                url.scheme()
            )));
        }
        if !self.login_path.starts_with('/') {
            return Err(AppError::Config("login path must start with /".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct Overrides {
    api_base_url: Option<String>,
    login_path: Option<String>,
    timeout_ms: Option<String>,
    cooldown_ms: Option<String>,
}

impl Overrides {
    fn from_env() -> Self {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .and_then(|value| normalize_value(&value))
        };
        Self {
            api_base_url: read("KATANAID_API_URL"),
            login_path: read("KATANAID_LOGIN_PATH"),
            timeout_ms: read("KATANAID_TIMEOUT_MS"),
            cooldown_ms: read("KATANAID_COOLDOWN_MS"),
        }
    }
}

fn apply_overrides(config: &mut ClientConfig, overrides: Overrides) -> Result<(), AppError> {
    if let Some(value) = overrides.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = overrides.login_path {
        config.login_path = value;
    }
    if let Some(value) = overrides.timeout_ms {
        config.request_timeout = parse_millis("KATANAID_TIMEOUT_MS", &value)?;
    }
    if let Some(value) = overrides.cooldown_ms {
        config.cooldown = parse_millis("KATANAID_COOLDOWN_MS", &value)?;
    }
    Ok(())
}

fn parse_millis(key: &str, value: &str) -> Result<Duration, AppError> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| AppError::Config(format!("{key} must be a number of milliseconds")))
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 4] = [
        "KATANAID_API_URL",
        "KATANAID_LOGIN_PATH",
        "KATANAID_TIMEOUT_MS",
        "KATANAID_COOLDOWN_MS",
    ];

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(
            normalize_value("  https://api.katanaid.dev "),
            Some("https://api.katanaid.dev".to_string())
        );
    }

    #[test]
    fn load_uses_defaults_without_env() {
        temp_env::with_vars_unset(VARS, || {
            let config = ClientConfig::load().expect("defaults are valid");
            assert_eq!(config, ClientConfig::default());
            assert_eq!(config.cooldown, Duration::from_millis(3000));
        });
    }

    #[test]
    fn load_applies_env_overrides() {
        temp_env::with_vars(
            [
                ("KATANAID_API_URL", Some("https://api.katanaid.dev")),
                ("KATANAID_LOGIN_PATH", Some("/signin")),
                ("KATANAID_TIMEOUT_MS", Some("2500")),
                ("KATANAID_COOLDOWN_MS", Some(" 500 ")),
            ],
            || {
                let config = ClientConfig::load().expect("overrides are valid");
                assert_eq!(config.api_base_url, "https://api.katanaid.dev");
                assert_eq!(config.login_path, "/signin");
                assert_eq!(config.request_timeout, Duration::from_millis(2500));
                assert_eq!(config.cooldown, Duration::from_millis(500));
            },
        );
    }

    #[test]
    fn load_ignores_blank_overrides() {
        temp_env::with_vars(
            [
                ("KATANAID_API_URL", Some("  ")),
                ("KATANAID_LOGIN_PATH", Some("")),
                ("KATANAID_TIMEOUT_MS", None),
                ("KATANAID_COOLDOWN_MS", None),
            ],
            || {
                let config = ClientConfig::load().expect("blank values are ignored");
                assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
                assert_eq!(config.login_path, DEFAULT_LOGIN_PATH);
            },
        );
    }

    #[test]
    fn load_rejects_bad_millis() {
        temp_env::with_vars(
            [
                ("KATANAID_API_URL", None),
                ("KATANAID_LOGIN_PATH", None),
                ("KATANAID_TIMEOUT_MS", Some("soon")),
                ("KATANAID_COOLDOWN_MS", None),
            ],
            || {
                let err = ClientConfig::load().expect_err("non-numeric timeout");
                assert!(err.to_string().contains("KATANAID_TIMEOUT_MS"));
            },
        );
    }

    #[test]
    fn validate_rejects_non_http_urls() {
        let config = ClientConfig::default().with_api_base_url("ftp://files.example.com");
        assert!(config.validate().is_err());

        let config = ClientConfig::default().with_api_base_url("not a url");
        assert!(config.validate().is_err());

        let config = ClientConfig::default().with_login_path("login");
        assert!(config.validate().is_err());
    }
}
