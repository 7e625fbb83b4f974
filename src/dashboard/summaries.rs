//! Reshaping of upstream documents into dashboard summaries.
//!
//! Pure functions over `serde_json::Value`; fields are addressed with JSON
//! pointers so a missing field reports exactly where it was expected.

use chrono::NaiveDateTime;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::sources::{SourceError, SourceResult};

/// Dispatcher calls served before metric collection started.
pub const CALLS_BEFORE_NEWRELIC: u64 = 1_025_779_805;

/// Realtime visitors are sampled; this scales them to an estimate of the whole audience.
pub const ACTIVE_VISITORS_FACTOR: u64 = 5;

const CALL_COUNT: &str = "/metric_data/metrics/0/timeslices/0/values/call_count";

/// Length of `YYYYmmddTHHMMSS`.
const PUBLICATION_STAMP_LEN: usize = 15;
const PUBLICATION_STAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// `{"name": ..., "value": ...}` tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedValue {
    pub name: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastReview {
    pub last_five_star_review: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppCount {
    pub number_of_apps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreDownloads {
    pub google_play: Value,
    pub ios_store: Value,
}

fn field<'a>(document: &'a Value, pointer: &str) -> SourceResult<&'a Value> {
    document
        .pointer(pointer)
        .ok_or_else(|| SourceError::MissingField(pointer.to_string()))
}

fn u64_field(document: &Value, pointer: &str) -> SourceResult<u64> {
    field(document, pointer)?
        .as_u64()
        .ok_or_else(|| SourceError::invalid(pointer, "expected a non-negative integer"))
}

fn array_field<'a>(document: &'a Value, pointer: &str) -> SourceResult<&'a Vec<Value>> {
    field(document, pointer)?
        .as_array()
        .ok_or_else(|| SourceError::invalid(pointer, "expected an array"))
}

pub fn call_count(metric_data: &Value) -> SourceResult<u64> {
    u64_field(metric_data, CALL_COUNT)
}

/// Fold the second window's calls and the pre-collection calls into the first document.
pub fn merge_call_counts(mut history: Value, today: &Value) -> SourceResult<Value> {
    let total = call_count(&history)?
        .saturating_add(call_count(today)?)
        .saturating_add(CALLS_BEFORE_NEWRELIC);

    if let Some(slot) = history.pointer_mut(CALL_COUNT) {
        *slot = Value::from(total);
    }
    Ok(history)
}

pub fn last_five_star_review(reviews: &Value) -> SourceResult<LastReview> {
    Ok(LastReview {
        last_five_star_review: field(reviews, "/reviews/0/original_review")?.clone(),
    })
}

pub fn count_apps(products: &Value) -> SourceResult<AppCount> {
    let products = products
        .as_object()
        .ok_or_else(|| SourceError::invalid("products", "expected an object keyed by product id"))?;

    Ok(AppCount {
        number_of_apps: products.len(),
    })
}

pub fn store_downloads(report: &Value) -> SourceResult<StoreDownloads> {
    Ok(StoreDownloads {
        google_play: field(report, "/google_play/downloads")?.clone(),
        ios_store: field(report, "/apple:ios/downloads")?.clone(),
    })
}

/// Estimated active users from the realtime export, with a small random jitter in `1..=9`.
pub fn active_users<R: Rng + ?Sized>(realtime: &Value, rng: &mut R) -> SourceResult<NamedValue> {
    const POINTER: &str = "/data/0/active_visitors";

    // The reporter writes counts as strings.
    let visitors = match field(realtime, POINTER)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .ok_or_else(|| SourceError::invalid(POINTER, "expected a visitor count"))?;

    let estimate = visitors
        .checked_mul(ACTIVE_VISITORS_FACTOR)
        .and_then(|users| users.checked_add(rng.gen_range(1..=9)))
        .ok_or_else(|| SourceError::invalid(POINTER, "visitor count out of range"))?;

    Ok(NamedValue {
        name: "current active users",
        value: estimate,
    })
}

pub fn region_ids(coverage: &Value) -> SourceResult<Vec<String>> {
    array_field(coverage, "/regions")?
        .iter()
        .enumerate()
        .map(|(i, region)| {
            let pointer = format!("/regions/{}/id", i);
            region
                .get("id")
                .ok_or_else(|| SourceError::MissingField(pointer.clone()))?
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| SourceError::invalid(pointer, "expected a string"))
        })
        .collect()
}

pub fn network_total(networks: &Value) -> SourceResult<u64> {
    u64_field(networks, "/pagination/total_result")
}

pub fn total_regions(value: u64) -> NamedValue {
    NamedValue {
        name: "total regions",
        value,
    }
}

/// Count regions whose data was published at or after `since`.
pub fn count_recent_publications(status: &Value, since: NaiveDateTime) -> SourceResult<NamedValue> {
    let mut value = 0;

    for (i, region) in array_field(status, "/regions")?.iter().enumerate() {
        let pointer = format!("/regions/{}/publication_date", i);
        let raw = region
            .get("publication_date")
            .ok_or_else(|| SourceError::MissingField(pointer.clone()))?
            .as_str()
            .ok_or_else(|| SourceError::invalid(pointer.as_str(), "expected a string"))?;

        let stamp = raw
            .get(..PUBLICATION_STAMP_LEN)
            .ok_or_else(|| SourceError::invalid(pointer.as_str(), format!("'{}' is too short", raw)))?;
        let published = NaiveDateTime::parse_from_str(stamp, PUBLICATION_STAMP_FORMAT)
            .map_err(|e| SourceError::invalid(pointer.as_str(), format!("'{}': {}", raw, e)))?;

        if published >= since {
            value += 1;
        }
    }

    Ok(NamedValue {
        name: "weekly update data",
        value,
    })
}
