//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DashboardConfig (validated, immutable)
//!     → upstream clients built from it, shared via ArcSwap
//!
//! With --watch:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps the snapshot atomically
//! ```

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AnalyticsConfig, AppFiguresConfig, DashboardConfig, ListenerConfig, LogFormat, NavitiaConfig,
    NewRelicConfig, ObservabilityConfig, TimeoutConfig,
};
