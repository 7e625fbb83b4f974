//! Failure injection: upstream errors, unreachable upstreams, broken documents.

use std::time::Duration;

use chrono::Utc;
use httpmock::prelude::*;
use kisiowall_api::dashboard::timeframe::start_of_day;
use kisiowall_api::sources::newrelic::format_timestamp;
use serde_json::{json, Value};

mod common;

fn message(body: &Value) -> &str {
    body.as_str().expect("error body should be a JSON string")
}

#[tokio::test]
async fn test_upstream_error_status_on_every_http_tile() {
    let mock = MockServer::start_async().await;
    let export = tempfile::tempdir().unwrap();

    mock.mock_async(|when, then| {
        when.method(GET);
        then.status(503).body("maintenance");
    })
    .await;

    let dashboard = common::spawn_dashboard(common::config_for(&mock, export.path())).await;

    let cases = [
        ("/total_call", "newrelic returned HTTP 503"),
        ("/volume_call", "newrelic returned HTTP 503"),
        ("/volume_call_summarize", "newrelic returned HTTP 503"),
        ("/volume_errors", "newrelic returned HTTP 503"),
        ("/last_review", "appfigures returned HTTP 503"),
        ("/number_of_apps", "appfigures returned HTTP 503"),
        ("/downloads_by_store", "appfigures returned HTTP 503"),
        ("/total_regions", "navitia returned HTTP 503"),
        ("/weekly_data_update", "navitia returned HTTP 503"),
    ];

    for (path, expected) in cases {
        let (status, body) = dashboard.get(path).await;
        assert_eq!(status, 500, "{}", path);
        assert_eq!(message(&body), expected, "{}", path);
    }
}

#[tokio::test]
async fn test_unreachable_upstreams() {
    let export = tempfile::tempdir().unwrap();
    let config = common::unreachable_config(export.path()).await;
    let dashboard = common::spawn_dashboard(config).await;

    for (path, source) in [
        ("/volume_call", "newrelic"),
        ("/last_review", "appfigures"),
        ("/total_regions", "navitia"),
    ] {
        let (status, body) = dashboard.get(path).await;
        assert_eq!(status, 500, "{}", path);
        assert!(
            message(&body).starts_with(&format!("{} request failed", source)),
            "{}: {}",
            path,
            message(&body)
        );
    }
}

#[tokio::test]
async fn test_first_failure_aborts_total_call() {
    let mock = MockServer::start_async().await;
    let export = tempfile::tempdir().unwrap();
    let midnight = format_timestamp(start_of_day(Utc::now()));

    let history = mock
        .mock_async(|when, then| {
            when.method(GET)
                .query_param("from", "2016-05-14T00:00:00+00:00");
            then.status(500);
        })
        .await;
    let today = mock
        .mock_async(|when, then| {
            when.method(GET).query_param("from", midnight.as_str());
            then.status(200)
                .json_body(json!({"metric_data": {"metrics": []}}));
        })
        .await;

    let dashboard = common::spawn_dashboard(common::config_for(&mock, export.path())).await;
    let (status, body) = dashboard.get("/total_call").await;

    assert_eq!(status, 500);
    assert_eq!(message(&body), "newrelic returned HTTP 500");
    history.assert_async().await;
    today.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_malformed_upstream_documents() {
    let mock = MockServer::start_async().await;
    let export = tempfile::tempdir().unwrap();

    mock.mock_async(|when, then| {
        when.path("/v2/reviews");
        then.status(200).json_body(json!({"total": 0, "reviews": []}));
    })
    .await;
    mock.mock_async(|when, then| {
        when.path("/v2/reports/sales/");
        then.status(200).body("<html>not json</html>");
    })
    .await;
    mock.mock_async(|when, then| {
        when.path("/v1/status/");
        then.status(200)
            .json_body(json!({"regions": [{"publication_date": "yesterday"}]}));
    })
    .await;

    let dashboard = common::spawn_dashboard(common::config_for(&mock, export.path())).await;

    let (status, body) = dashboard.get("/last_review").await;
    assert_eq!(status, 500);
    assert_eq!(message(&body), "missing field '/reviews/0/original_review'");

    let (status, body) = dashboard.get("/downloads_by_store").await;
    assert_eq!(status, 500);
    assert!(message(&body).starts_with("appfigures request failed"));

    let (status, body) = dashboard.get("/weekly_data_update").await;
    assert_eq!(status, 500);
    assert!(message(&body).starts_with("invalid field '/regions/0/publication_date'"));
}

#[tokio::test]
async fn test_missing_and_broken_export_file() {
    let mock = MockServer::start_async().await;
    let export = tempfile::tempdir().unwrap();
    let dashboard = common::spawn_dashboard(common::config_for(&mock, export.path())).await;

    let (status, body) = dashboard.get("/active_users").await;
    assert_eq!(status, 500);
    assert!(message(&body).starts_with("cannot read"));
    assert!(message(&body).contains("realtime.json"));

    std::fs::write(
        export.path().join("realtime.json"),
        r#"{"data": [{"active_visitors": null}]}"#,
    )
    .unwrap();

    let (status, body) = dashboard.get("/active_users").await;
    assert_eq!(status, 500);
    assert!(message(&body).contains("/data/0/active_visitors"));
}

#[tokio::test]
async fn test_request_deadline_answers_like_a_failed_tile() {
    let mock = MockServer::start_async().await;
    let export = tempfile::tempdir().unwrap();

    mock.mock_async(|when, then| {
        when.path("/v2/products/mine");
        then.status(200)
            .delay(Duration::from_secs(3))
            .json_body(json!({"1": {}}));
    })
    .await;

    let mut config = common::config_for(&mock, export.path());
    config.timeouts.request_secs = 1;
    let dashboard = common::spawn_dashboard(config).await;

    let (status, body) = dashboard.get("/number_of_apps").await;
    assert_eq!(status, 500);
    assert_eq!(message(&body), "request timed out after 1s");

    let (status, body) = dashboard.get("/status").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "operational");
}

#[tokio::test]
async fn test_config_update_switches_upstream() {
    let old_mock = MockServer::start_async().await;
    let new_mock = MockServer::start_async().await;
    let export = tempfile::tempdir().unwrap();

    old_mock
        .mock_async(|when, then| {
            when.path("/v2/products/mine");
            then.status(200).json_body(json!({"1": {}}));
        })
        .await;
    new_mock
        .mock_async(|when, then| {
            when.path("/v2/products/mine");
            then.status(200).json_body(json!({"1": {}, "2": {}, "3": {}, "4": {}}));
        })
        .await;

    let dashboard = common::spawn_dashboard(common::config_for(&old_mock, export.path())).await;

    let (_, body) = dashboard.get("/number_of_apps").await;
    assert_eq!(body["number_of_apps"], 1);

    dashboard
        .config_tx
        .send(common::config_for(&new_mock, export.path()))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (status, body) = dashboard.get("/number_of_apps").await;
    assert_eq!(status, 200);
    assert_eq!(body["number_of_apps"], 4);
}
