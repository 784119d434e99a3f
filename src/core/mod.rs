//! Service wiring (HTTP surface).

pub mod http;

pub use http::{create_router, start_server, AppState, HealthStatus};
