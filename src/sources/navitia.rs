//! Navitia transit data client.

use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::NavitiaConfig;
use crate::sources::{fetch_json, header_map, SourceResult};

const SOURCE: &str = "navitia";

#[derive(Debug, Clone)]
pub struct NavitiaClient {
    http: Client,
    base: Url,
    headers: HeaderMap,
}

impl NavitiaClient {
    pub fn new(http: Client, config: &NavitiaConfig) -> SourceResult<Self> {
        Ok(Self {
            http,
            base: Url::parse(&config.url)?,
            headers: header_map(&config.headers)?,
        })
    }

    async fn get(&self, path: &str) -> SourceResult<Value> {
        let url = self.base.join(path)?;
        let request = self.http.get(url).headers(self.headers.clone());
        fetch_json(SOURCE, request).await
    }

    /// All coverage regions.
    pub async fn coverage(&self) -> SourceResult<Value> {
        self.get("coverage/").await
    }

    /// Transport networks of one region.
    pub async fn region_networks(&self, region_id: &str) -> SourceResult<Value> {
        let mut url = self.base.join("coverage/")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend([region_id, "networks"]);

        let request = self.http.get(url).headers(self.headers.clone());
        fetch_json(SOURCE, request).await
    }

    /// Per-region data publication status.
    pub async fn status(&self) -> SourceResult<Value> {
        self.get("status/").await
    }
}
