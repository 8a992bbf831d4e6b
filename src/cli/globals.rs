use crate::cli::commands::api::{ARG_API_URL, ARG_COOLDOWN_MS, ARG_LOGIN_PATH, ARG_TIMEOUT_MS};
use crate::katanaid::config::{ClientConfig, DEFAULT_COOLDOWN, DEFAULT_TIMEOUT};
use anyhow::Result;
use std::time::Duration;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    pub api_url: String,
    pub login_path: String,
    pub timeout: Duration,
    pub cooldown: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        let defaults = ClientConfig::default();
        Self {
            api_url: matches
                .get_one::<String>(ARG_API_URL)
                .cloned()
                .unwrap_or(defaults.api_base_url),
            login_path: matches
                .get_one::<String>(ARG_LOGIN_PATH)
                .cloned()
                .unwrap_or(defaults.login_path),
            timeout: matches
                .get_one::<u64>(ARG_TIMEOUT_MS)
                .map_or(DEFAULT_TIMEOUT, |ms| Duration::from_millis(*ms)),
            cooldown: matches
                .get_one::<u64>(ARG_COOLDOWN_MS)
                .map_or(DEFAULT_COOLDOWN, |ms| Duration::from_millis(*ms)),
        }
    }

    /// # Errors
    /// Returns an error if the resulting configuration is invalid.
    pub fn config(&self) -> Result<ClientConfig> {
        let config = ClientConfig::default()
            .with_api_base_url(self.api_url.trim())
            .with_login_path(self.login_path.trim())
            .with_request_timeout(self.timeout)
            .with_cooldown(self.cooldown);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn test_global_args() {
        temp_env::with_vars_unset(
            [
                "KATANAID_API_URL",
                "KATANAID_LOGIN_PATH",
                "KATANAID_TIMEOUT_MS",
                "KATANAID_COOLDOWN_MS",
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "katanaid",
                    "--cooldown-ms",
                    "500",
                    "health",
                ]);
                let globals = GlobalArgs::from_matches(&matches);
                assert_eq!(globals.api_url, "http://localhost:8080");
                assert_eq!(globals.cooldown, Duration::from_millis(500));

                let config = globals.config().expect("valid config");
                assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
                assert_eq!(config.login_path, "/login");
            },
        );
    }

    #[test]
    fn test_invalid_api_url() {
        let globals = GlobalArgs {
            api_url: "ftp://files.katanaid.dev".to_string(),
            login_path: "/login".to_string(),
            timeout: DEFAULT_TIMEOUT,
            cooldown: DEFAULT_COOLDOWN,
        };
        assert!(globals.config().is_err());
    }
}
