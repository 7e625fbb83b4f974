use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::dashboard::summaries::{self, AppCount, LastReview, NamedValue, StoreDownloads};
use crate::dashboard::timeframe;
use crate::http::server::AppState;
use crate::sources::SourceError;

type DashboardResult<T> = Result<Json<T>, SourceError>;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

/// Dispatcher calls since launch, including calls served before monitoring.
pub async fn get_total_call(State(state): State<AppState>) -> DashboardResult<Value> {
    let inner = state.inner.load_full();
    let [history, today] = timeframe::total_call_queries(Utc::now());

    let history = inner.sources.newrelic.metric_data(&history).await?;
    let today = inner.sources.newrelic.metric_data(&today).await?;

    Ok(Json(summaries::merge_call_counts(history, &today)?))
}

pub async fn get_volume_call(State(state): State<AppState>) -> DashboardResult<Value> {
    let inner = state.inner.load_full();
    let query = timeframe::volume_call_query(Utc::now());
    Ok(Json(inner.sources.newrelic.metric_data(&query).await?))
}

pub async fn get_volume_call_summarize(State(state): State<AppState>) -> DashboardResult<Value> {
    let inner = state.inner.load_full();
    let query = timeframe::volume_call_summarize_query(Utc::now());
    Ok(Json(inner.sources.newrelic.metric_data(&query).await?))
}

pub async fn get_volume_errors(State(state): State<AppState>) -> DashboardResult<Value> {
    let inner = state.inner.load_full();
    let query = timeframe::volume_errors_query(Utc::now());
    Ok(Json(inner.sources.newrelic.metric_data(&query).await?))
}

pub async fn get_last_review(State(state): State<AppState>) -> DashboardResult<LastReview> {
    let inner = state.inner.load_full();
    let reviews = inner.sources.appfigures.five_star_reviews().await?;
    Ok(Json(summaries::last_five_star_review(&reviews)?))
}

pub async fn get_number_of_apps(State(state): State<AppState>) -> DashboardResult<AppCount> {
    let inner = state.inner.load_full();
    let products = inner.sources.appfigures.my_products().await?;
    Ok(Json(summaries::count_apps(&products)?))
}

pub async fn get_downloads_by_store(State(state): State<AppState>) -> DashboardResult<StoreDownloads> {
    let inner = state.inner.load_full();
    let report = inner.sources.appfigures.sales_by_store().await?;
    Ok(Json(summaries::store_downloads(&report)?))
}

pub async fn get_active_users(State(state): State<AppState>) -> DashboardResult<NamedValue> {
    let inner = state.inner.load_full();
    let realtime = inner.sources.analytics.realtime().await?;
    Ok(Json(summaries::active_users(&realtime, &mut rand::thread_rng())?))
}

/// Sum of transport networks over every coverage region.
///
/// A region whose networks call fails with an HTTP status is left out of the
/// sum; transport errors abort the whole request.
pub async fn get_total_regions(State(state): State<AppState>) -> DashboardResult<NamedValue> {
    let inner = state.inner.load_full();
    let navitia = &inner.sources.navitia;

    let coverage = navitia.coverage().await?;
    let mut total: u64 = 0;

    for region_id in summaries::region_ids(&coverage)? {
        match navitia.region_networks(&region_id).await {
            Ok(networks) => total += summaries::network_total(&networks)?,
            Err(SourceError::Status { status, .. }) => {
                tracing::warn!(region = %region_id, status, "Skipping region without networks");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Json(summaries::total_regions(total)))
}

pub async fn get_weekly_data_update(State(state): State<AppState>) -> DashboardResult<NamedValue> {
    let inner = state.inner.load_full();
    let status = inner.sources.navitia.status().await?;
    let since = timeframe::week_before(Utc::now().naive_utc());
    Ok(Json(summaries::count_recent_publications(&status, since)?))
}
