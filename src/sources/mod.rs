//! Upstream data sources.
//!
//! # Data Flow
//! ```text
//! handler
//!     → newrelic.rs / appfigures.rs / navitia.rs (build request, add credentials)
//!     → fetch_json (send, check status, decode body, record metrics)
//!     → serde_json::Value handed back for reshaping
//!
//! handler
//!     → analytics.rs (read realtime.json from the export directory)
//! ```
//!
//! All HTTP sources share one pooled `reqwest::Client` built from the
//! `[timeouts]` section.

pub mod analytics;
pub mod appfigures;
pub mod navitia;
pub mod newrelic;
pub mod types;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::config::{DashboardConfig, TimeoutConfig};
use crate::observability::metrics;

pub use analytics::AnalyticsExport;
pub use appfigures::AppFiguresClient;
pub use navitia::NavitiaClient;
pub use newrelic::{MetricQuery, NewRelicClient};
pub use types::{SourceError, SourceResult};

/// Every upstream the dashboard reads from, built from one configuration snapshot.
#[derive(Debug, Clone)]
pub struct Sources {
    pub newrelic: NewRelicClient,
    pub appfigures: AppFiguresClient,
    pub navitia: NavitiaClient,
    pub analytics: AnalyticsExport,
}

impl Sources {
    /// Build all clients, sharing a single connection pool.
    pub fn from_config(config: &DashboardConfig) -> SourceResult<Self> {
        let http = build_http_client(&config.timeouts)?;

        Ok(Self {
            newrelic: NewRelicClient::new(http.clone(), &config.newrelic)?,
            appfigures: AppFiguresClient::new(http.clone(), &config.appfigures)?,
            navitia: NavitiaClient::new(http, &config.navitia)?,
            analytics: AnalyticsExport::new(&config.analytics),
        })
    }
}

/// Build the outbound HTTP client.
pub fn build_http_client(timeouts: &TimeoutConfig) -> SourceResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeouts.upstream_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(SourceError::Client)
}

/// Convert configured static headers into a `HeaderMap`, marking every value sensitive.
pub(crate) fn header_map(headers: &BTreeMap<String, String>) -> SourceResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| SourceError::Header(name.clone()))?;
        let mut header_value =
            HeaderValue::from_str(value).map_err(|_| SourceError::Header(name.clone()))?;
        // Static headers carry API keys.
        header_value.set_sensitive(true);
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Send a prepared request and decode a successful JSON answer.
///
/// Any non-2xx status becomes [`SourceError::Status`].
pub(crate) async fn fetch_json(source_name: &'static str, request: RequestBuilder) -> SourceResult<Value> {
    let start = Instant::now();

    let response = match request.send().await {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(source = source_name, error = %error, "Upstream unreachable");
            metrics::record_upstream(source_name, "error", start);
            return Err(SourceError::Request { source_name, error });
        }
    };

    let status = response.status();
    tracing::debug!(
        source = source_name,
        url = %response.url(),
        status = %status,
        "Upstream responded"
    );

    if !status.is_success() {
        tracing::warn!(source = source_name, status = %status, "Upstream returned non-success status");
        metrics::record_upstream(source_name, "status", start);
        return Err(SourceError::Status {
            source_name,
            status: status.as_u16(),
        });
    }

    let body = response.json::<Value>().await.map_err(|error| {
        metrics::record_upstream(source_name, "decode", start);
        SourceError::Request { source_name, error }
    })?;

    metrics::record_upstream(source_name, "ok", start);
    Ok(body)
}
