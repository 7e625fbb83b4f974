//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared state (configuration snapshot + upstream clients)
//! - Create the Axum router with all dashboard handlers
//! - Wire up middleware (request id, tracing, timeout, metrics)
//! - Apply configuration updates by swapping the snapshot
//! - Serve until the shutdown signal, draining in-flight requests

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::DashboardConfig;
use crate::dashboard::setup_dashboard_router;
use crate::http::request::{make_request_span, UuidRequestId};
use crate::observability::metrics;
use crate::sources::{SourceError, SourceResult, Sources};

/// One consistent view of configuration and the clients built from it.
#[derive(Debug)]
pub struct InnerState {
    pub config: DashboardConfig,
    pub sources: Sources,
}

impl InnerState {
    pub fn from_config(config: DashboardConfig) -> SourceResult<Self> {
        let sources = Sources::from_config(&config)?;
        Ok(Self { config, sources })
    }
}

/// Application state injected into handlers.
///
/// Handlers take a snapshot with `inner.load_full()` and keep it for the
/// whole request, so a reload never mixes old and new upstreams.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<InnerState>>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> SourceResult<Self> {
        Ok(Self {
            inner: Arc::new(ArcSwap::from_pointee(InnerState::from_config(config)?)),
        })
    }

    /// Replace the snapshot. On error the current one stays in place.
    pub fn reload(&self, config: DashboardConfig) -> SourceResult<()> {
        let next = InnerState::from_config(config)?;
        let previous = self.inner.swap(Arc::new(next));

        let current = self.inner.load();
        if previous.config.listener != current.config.listener
            || previous.config.timeouts.request_secs != current.config.timeouts.request_secs
        {
            tracing::warn!("Listener and request timeout changes take effect after a restart");
        }
        Ok(())
    }
}

/// HTTP server for the dashboard API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: DashboardConfig) -> SourceResult<Self> {
        let state = AppState::new(config)?;
        let router = Self::build_router(&state);
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Metrics wrap the deadline so timed-out requests are still counted.
    fn build_router(state: &AppState) -> Router {
        let request_timeout = Duration::from_secs(state.inner.load().config.timeouts.request_secs);

        setup_dashboard_router(state.clone())
            .layer(middleware::from_fn_with_state(request_timeout, enforce_deadline))
            .layer(middleware::from_fn(track_metrics))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Shared state, for applying updates from outside the server.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<DashboardConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match state.reload(config) {
                    Ok(()) => tracing::info!("Configuration reloaded"),
                    Err(e) => tracing::error!(
                        error = %e,
                        "Failed to apply new configuration, keeping current one"
                    ),
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Count and time every request by matched route.
async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&endpoint, response.status().as_u16(), start);
    response
}

/// Answer like any other failed tile once the request deadline passes.
async fn enforce_deadline(
    State(deadline): State<Duration>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => SourceError::Timeout(deadline.as_secs()).into_response(),
    }
}
