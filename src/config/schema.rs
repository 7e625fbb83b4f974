//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dashboard API.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the dashboard API.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// New Relic metric data API.
    pub newrelic: NewRelicConfig,

    /// Appfigures store analytics API.
    pub appfigures: AppFiguresConfig,

    /// Navitia transit data API.
    pub navitia: NavitiaConfig,

    /// Local analytics reporter export.
    pub analytics: AnalyticsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Timeout configuration for inbound and outbound requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a whole inbound request, upstream calls included.
    pub request_secs: u64,

    /// Total timeout for a single upstream call.
    pub upstream_secs: u64,

    /// Connection establishment timeout for upstream calls.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            upstream_secs: 30,
            connect_secs: 5,
        }
    }
}

const REDACTED: &str = "<redacted>";

/// Header names with their values hidden.
fn redacted_headers(headers: &BTreeMap<String, String>) -> BTreeMap<&str, &str> {
    headers.keys().map(|name| (name.as_str(), REDACTED)).collect()
}

/// New Relic metric data endpoint.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NewRelicConfig {
    /// Full URL of the application's `metrics/data.json` resource.
    pub url: String,

    /// Static headers sent with every call (usually `X-Api-Key`).
    pub headers: BTreeMap<String, String>,
}

impl Default for NewRelicConfig {
    fn default() -> Self {
        Self {
            url: "https://api.newrelic.com/v2/applications/0/metrics/data.json".to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for NewRelicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewRelicConfig")
            .field("url", &self.url)
            .field("headers", &redacted_headers(&self.headers))
            .finish()
    }
}

/// Appfigures API credentials.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppFiguresConfig {
    /// Base URL, must end with `/`.
    pub url: String,

    /// Client key sent as `X-Client-Key`.
    pub api_key: String,

    /// Basic auth user.
    pub username: String,

    /// Basic auth password.
    pub password: String,
}

impl Default for AppFiguresConfig {
    fn default() -> Self {
        Self {
            url: "https://api.appfigures.com/v2/".to_string(),
            api_key: String::new(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for AppFiguresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppFiguresConfig")
            .field("url", &self.url)
            .field("api_key", &REDACTED)
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Navitia API endpoint.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NavitiaConfig {
    /// Base URL, must end with `/`.
    pub url: String,

    /// Static headers sent with every call (usually `Authorization`).
    pub headers: BTreeMap<String, String>,
}

impl Default for NavitiaConfig {
    fn default() -> Self {
        Self {
            url: "https://api.navitia.io/v1/".to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for NavitiaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavitiaConfig")
            .field("url", &self.url)
            .field("headers", &redacted_headers(&self.headers))
            .finish()
    }
}

/// Analytics reporter export location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Directory holding `realtime.json`.
    pub export_path: PathBuf,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            export_path: PathBuf::from("/var/lib/analytics-reporter"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Append logs to this file instead of stdout.
    pub log_file: Option<PathBuf>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            log_file: None,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
