//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;

use httpmock::MockServer;
use kisiowall_api::config::DashboardConfig;
use kisiowall_api::http::HttpServer;
use kisiowall_api::lifecycle::Shutdown;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Basic auth for `wall:secret`.
#[allow(dead_code)]
pub const APPFIGURES_AUTH: &str = "Basic d2FsbDpzZWNyZXQ=";

/// A dashboard running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    #[allow(dead_code)]
    pub config_tx: mpsc::UnboundedSender<DashboardConfig>,
    client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET a tile, returning status and decoded JSON body.
    pub async fn get(&self, path: &str) -> (u16, Value) {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("dashboard unreachable");
        let status = res.status().as_u16();
        let body = res.json::<Value>().await.expect("body is not JSON");
        (status, body)
    }

    #[allow(dead_code)]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the dashboard with the given configuration.
pub async fn spawn_dashboard(config: DashboardConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).expect("invalid test configuration");
    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    TestServer {
        addr,
        shutdown,
        config_tx,
        client,
    }
}

/// Configuration pointing every upstream at `mock` and the export at `export_dir`.
pub fn config_for(mock: &MockServer, export_dir: &Path) -> DashboardConfig {
    let mut config = DashboardConfig::default();

    config.newrelic.url = mock.url("/v2/applications/42/metrics/data.json");
    config
        .newrelic
        .headers
        .insert("X-Api-Key".to_string(), "nr-key".to_string());

    config.appfigures.url = mock.url("/v2/");
    config.appfigures.api_key = "client-key".to_string();
    config.appfigures.username = "wall".to_string();
    config.appfigures.password = "secret".to_string();

    config.navitia.url = mock.url("/v1/");
    config
        .navitia
        .headers
        .insert("Authorization".to_string(), "navitia-token".to_string());

    config.analytics.export_path = export_dir.to_path_buf();
    config.timeouts.upstream_secs = 5;
    config.timeouts.connect_secs = 1;
    config
}

/// Configuration whose upstreams all point at a closed local port.
#[allow(dead_code)]
pub async fn unreachable_config(export_dir: &Path) -> DashboardConfig {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{}", port);

    let mut config = DashboardConfig::default();
    config.newrelic.url = format!("{}/v2/applications/42/metrics/data.json", base);
    config.appfigures.url = format!("{}/v2/", base);
    config.navitia.url = format!("{}/v1/", base);
    config.analytics.export_path = export_dir.to_path_buf();
    config.timeouts.upstream_secs = 2;
    config.timeouts.connect_secs = 1;
    config
}
