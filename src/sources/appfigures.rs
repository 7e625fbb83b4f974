//! Appfigures store analytics client.
//!
//! Every call is authenticated twice: HTTP basic auth for the account and the
//! `X-Client-Key` header for the registered client application.

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::AppFiguresConfig;
use crate::sources::{fetch_json, SourceResult};

const SOURCE: &str = "appfigures";

pub const CLIENT_KEY_HEADER: &str = "X-Client-Key";

#[derive(Clone)]
pub struct AppFiguresClient {
    http: Client,
    base: Url,
    api_key: String,
    username: String,
    password: String,
}

impl AppFiguresClient {
    pub fn new(http: Client, config: &AppFiguresConfig) -> SourceResult<Self> {
        Ok(Self {
            http,
            base: Url::parse(&config.url)?,
            api_key: config.api_key.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Authenticated GET of a path relative to the base URL.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> SourceResult<Value> {
        let url = self.base.join(path.trim_start_matches('/'))?;
        let request = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(CLIENT_KEY_HEADER, &self.api_key)
            .query(query);

        fetch_json(SOURCE, request).await
    }

    /// Five-star French reviews, newest first.
    pub async fn five_star_reviews(&self) -> SourceResult<Value> {
        self.get("reviews", &[("stars", "5"), ("lang", "fr"), ("sort", "date")])
            .await
    }

    /// Products owned by the account, keyed by product id.
    pub async fn my_products(&self) -> SourceResult<Value> {
        self.get("products/mine", &[]).await
    }

    /// Sales report grouped by store.
    pub async fn sales_by_store(&self) -> SourceResult<Value> {
        self.get("reports/sales/", &[("group_by", "store")]).await
    }
}

impl std::fmt::Debug for AppFiguresClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppFiguresClient")
            .field("base", &self.base.as_str())
            .field("username", &self.username)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_credentials() {
        let config = AppFiguresConfig {
            api_key: "client-key".to_string(),
            username: "wall".to_string(),
            password: "hunter2".to_string(),
            ..AppFiguresConfig::default()
        };
        let client = AppFiguresClient::new(Client::new(), &config).unwrap();
        let debug = format!("{:?}", client);

        assert!(debug.contains("wall"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("client-key"));
    }
}
