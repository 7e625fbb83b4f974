//! Configuration validation.
//!
//! Serde handles the syntax; this module checks values that would only fail
//! later, at bind time or on the first upstream call. Every problem is
//! reported, not just the first one.

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::config::schema::DashboardConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending key, e.g. `navitia.url`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DashboardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);

    let timeouts = [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    check_url(&mut errors, "newrelic.url", &config.newrelic.url, false);
    check_headers(&mut errors, "newrelic.headers", &config.newrelic.headers);

    check_url(&mut errors, "appfigures.url", &config.appfigures.url, true);
    if HeaderValue::from_str(&config.appfigures.api_key).is_err() {
        errors.push(ValidationError::new(
            "appfigures.api_key",
            "not a valid header value",
        ));
    }

    check_url(&mut errors, "navitia.url", &config.navitia.url, true);
    check_headers(&mut errors, "navitia.headers", &config.navitia.headers);

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            field,
            format!("'{}' is not a socket address", value),
        ));
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str, is_base: bool) {
    match Url::parse(value) {
        Ok(url) => {
            if !matches!(url.scheme(), "http" | "https") {
                errors.push(ValidationError::new(
                    field,
                    format!("unsupported scheme '{}'", url.scheme()),
                ));
            }
            // Relative paths are joined onto base URLs.
            if is_base && !url.path().ends_with('/') {
                errors.push(ValidationError::new(field, "base URL must end with '/'"));
            }
        }
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

fn check_headers(errors: &mut Vec<ValidationError>, field: &str, headers: &BTreeMap<String, String>) {
    for (name, value) in headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                field,
                format!("invalid header name '{}'", name),
            ));
        }
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::new(
                field,
                format!("invalid value for header '{}'", name),
            ));
        }
    }
}
