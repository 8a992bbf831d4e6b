use super::{errors::AppError, transport::ApiClient};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::instrument;

pub const DASHBOARD_STATS_PATH: &str = "/api/dashboard/stats";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
}

impl TimeRange {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            "90d" => Ok(Self::Quarter),
            other => Err(format!("invalid time range '{other}', expected 7d, 30d or 90d")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUsage {
    pub service_name: String,
    pub service_key: String,
    pub total_calls: u64,
    #[serde(default)]
    pub recent_calls: Vec<DailyCount>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_calls: u64,
    #[serde(default)]
    pub services: Vec<ServiceUsage>,
    pub time_range: String,
}

/// Fetches per-service API usage for `range`.
///
/// # Errors
/// Any transport error; a 401 also tears the session down.
#[instrument(skip(client))]
pub async fn fetch_stats(client: &ApiClient, range: TimeRange) -> Result<DashboardStats, AppError> {
    client
        .get_json(DASHBOARD_STATS_PATH, &[("range", range.as_str())])
        .await
}
