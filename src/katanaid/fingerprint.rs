//! Device fingerprint collection. A fingerprint is an opaque bundle of
//! environment signals sent to the scoring service; it is collected
//! synchronously, never persisted, and is not identifying on its own.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintData {
    pub user_agent: String,
    pub language: String,
    pub languages: Vec<String>,
    pub timezone: String,
    pub platform: String,
    pub architecture: String,
    pub hardware_concurrency: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayInfo>,
    /// Unix time in milliseconds.
    pub collected_at: u64,
}

/// Produces a fresh fingerprint on every call.
pub trait FingerprintSource: Send + Sync {
    fn collect(&self) -> FingerprintData;
}

/// Reads signals from the running process: locale and timezone variables,
/// OS/arch, available parallelism and terminal dimensions.
#[derive(Clone, Debug)]
pub struct SystemFingerprint {
    user_agent: String,
}

impl SystemFingerprint {
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    fn collect_with(&self, lookup: impl Fn(&str) -> Option<String>) -> FingerprintData {
        let language = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .find_map(|key| lookup(key).and_then(|value| normalize_locale(&value)))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let mut languages: Vec<String> = lookup("LANGUAGE")
            .map(|value| value.split(':').filter_map(normalize_locale).collect())
            .unwrap_or_default();
        if languages.is_empty() {
            languages.push(language.clone());
        }

        let timezone = lookup("TZ")
            .map(|tz| tz.trim().trim_start_matches(':').to_string())
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let display = match (
            lookup("COLUMNS").and_then(|v| v.trim().parse().ok()),
            lookup("LINES").and_then(|v| v.trim().parse().ok()),
        ) {
            (Some(width), Some(height)) => Some(DisplayInfo { width, height }),
            _ => None,
        };

        FingerprintData {
            user_agent: self.user_agent.clone(),
            language,
            languages,
            timezone,
            platform: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            hardware_concurrency: std::thread::available_parallelism().map_or(1, usize::from),
            display,
            collected_at: now_millis(),
        }
    }
}

impl FingerprintSource for SystemFingerprint {
    fn collect(&self) -> FingerprintData {
        self.collect_with(|key| std::env::var(key).ok())
    }
}

/// `en_US.UTF-8` -> `en-US`; `C` and `POSIX` carry no language.
fn normalize_locale(raw: &str) -> Option<String> {
    let tag = raw.trim().split(['.', '@']).next()?.trim();
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }
    Some(tag.replace('_', "-"))
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}
