//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and sources produce:
//!     → logging.rs (structured log events, one span per request)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout or the configured log file
//!     → Prometheus scrape endpoint (when enabled)
//! ```

pub mod logging;
pub mod metrics;
