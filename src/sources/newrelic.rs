//! New Relic metric data client.
//!
//! Queries the application's `metrics/data.json` resource. The response is
//! returned untouched; callers decide what to extract.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::NewRelicConfig;
use crate::sources::{fetch_json, header_map, SourceResult};

const SOURCE: &str = "newrelic";

/// Web transaction metric, one timeslice per dispatched HTTP call.
pub const HTTP_DISPATCHER: &str = "HttpDispatcher";

/// Application error metric.
pub const ERRORS_ALL: &str = "Errors/all";

/// Format a timestamp the way the metric API expects it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
}

/// One metric data query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub name: &'static str,
    pub from: DateTime<Utc>,
    /// Open-ended when `None`; the API then stops at "now".
    pub to: Option<DateTime<Utc>>,
    /// Collapse the window into a single timeslice.
    pub summarize: bool,
}

impl MetricQuery {
    pub fn new(name: &'static str, from: DateTime<Utc>) -> Self {
        Self {
            name,
            from,
            to: None,
            summarize: false,
        }
    }

    pub fn until(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    pub fn summarized(mut self) -> Self {
        self.summarize = true;
        self
    }

    /// Query string pairs, in the order the API documents them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("names[]", self.name.to_string()),
            ("from", format_timestamp(self.from)),
        ];
        if let Some(to) = self.to {
            params.push(("to", format_timestamp(to)));
        }
        if self.summarize {
            params.push(("summarize", "true".to_string()));
        }
        params
    }
}

#[derive(Debug, Clone)]
pub struct NewRelicClient {
    http: Client,
    url: Url,
    headers: HeaderMap,
}

impl NewRelicClient {
    pub fn new(http: Client, config: &NewRelicConfig) -> SourceResult<Self> {
        Ok(Self {
            http,
            url: Url::parse(&config.url)?,
            headers: header_map(&config.headers)?,
        })
    }

    /// Fetch metric data for one query.
    pub async fn metric_data(&self, query: &MetricQuery) -> SourceResult<Value> {
        let request = self
            .http
            .get(self.url.clone())
            .headers(self.headers.clone())
            .query(&query.params());

        fetch_json(SOURCE, request).await
    }
}
