//! Time windows for the dashboard queries.
//!
//! Everything is computed from an explicit `now` so handlers pass
//! `Utc::now()` and tests pass a fixed instant.

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use crate::sources::newrelic::{ERRORS_ALL, HTTP_DISPATCHER};
use crate::sources::MetricQuery;

/// 2016-05-14T00:00:00Z, first day of metric collection.
const NEWRELIC_LAUNCH_SECS: i64 = 1_463_184_000;

pub fn newrelic_launch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(NEWRELIC_LAUNCH_SECS)
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

pub fn hours_before(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    now - TimeDelta::hours(hours)
}

/// Cut-off for the weekly data update count.
pub fn week_before(now: NaiveDateTime) -> NaiveDateTime {
    now - TimeDelta::days(7)
}

/// Summed dispatcher calls: launch up to today, then today so far.
pub fn total_call_queries(now: DateTime<Utc>) -> [MetricQuery; 2] {
    let today = start_of_day(now);
    [
        MetricQuery::new(HTTP_DISPATCHER, newrelic_launch())
            .until(today)
            .summarized(),
        MetricQuery::new(HTTP_DISPATCHER, today).summarized(),
    ]
}

/// Dispatcher timeslices over the last three hours.
pub fn volume_call_query(now: DateTime<Utc>) -> MetricQuery {
    MetricQuery::new(HTTP_DISPATCHER, hours_before(now, 3)).until(now)
}

/// Dispatcher total over the last 24 hours.
pub fn volume_call_summarize_query(now: DateTime<Utc>) -> MetricQuery {
    MetricQuery::new(HTTP_DISPATCHER, hours_before(now, 24))
        .until(now)
        .summarized()
}

/// Error total since 24 hours ago.
pub fn volume_errors_query(now: DateTime<Utc>) -> MetricQuery {
    MetricQuery::new(ERRORS_ALL, hours_before(now, 24)).summarized()
}
