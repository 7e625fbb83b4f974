//! Dashboard API library: read-only JSON tiles computed from monitoring,
//! store analytics, transit data and a local analytics export.

pub mod config;
pub mod dashboard;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod sources;

pub use config::schema::DashboardConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
