//! Dashboard endpoints.
//!
//! # Data Flow
//! ```text
//! GET /<tile>
//!     → handlers.rs (one handler per tile)
//!     → timeframe.rs (query windows from "now")
//!     → sources (upstream call)
//!     → summaries.rs (extract / sum / count)
//!     → JSON body, 200
//!
//! Any error → SourceError → JSON string body, 500
//! ```

pub mod handlers;
pub mod summaries;
pub mod timeframe;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_dashboard_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/total_call", get(get_total_call))
        .route("/volume_call", get(get_volume_call))
        .route("/volume_call_summarize", get(get_volume_call_summarize))
        .route("/volume_errors", get(get_volume_errors))
        .route("/last_review", get(get_last_review))
        .route("/number_of_apps", get(get_number_of_apps))
        .route("/downloads_by_store", get(get_downloads_by_store))
        .route("/active_users", get(get_active_users))
        .route("/total_regions", get(get_total_regions))
        .route("/weekly_data_update", get(get_weekly_data_update))
        .with_state(state)
}
