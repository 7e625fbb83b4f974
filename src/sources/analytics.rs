//! Analytics reporter export reader.
//!
//! The reporter periodically rewrites `realtime.json` in its export directory;
//! the file is read fresh on every call.

use std::path::PathBuf;
use std::time::Instant;

use serde_json::Value;

use crate::config::AnalyticsConfig;
use crate::observability::metrics;
use crate::sources::{SourceError, SourceResult};

const SOURCE: &str = "analytics_export";

pub const REALTIME_FILE: &str = "realtime.json";

#[derive(Debug, Clone)]
pub struct AnalyticsExport {
    dir: PathBuf,
}

impl AnalyticsExport {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            dir: config.export_path.clone(),
        }
    }

    pub fn realtime_path(&self) -> PathBuf {
        self.dir.join(REALTIME_FILE)
    }

    /// Load the realtime report.
    pub async fn realtime(&self) -> SourceResult<Value> {
        let start = Instant::now();
        let path = self.realtime_path();

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(error) => {
                metrics::record_upstream(SOURCE, "error", start);
                return Err(SourceError::Io { path, error });
            }
        };

        let document = serde_json::from_str(&content).map_err(|e| {
            metrics::record_upstream(SOURCE, "decode", start);
            SourceError::from(e)
        })?;

        metrics::record_upstream(SOURCE, "ok", start);
        Ok(document)
    }
}
