//! Test utilities for bot service integration tests

use axum_test::TestServer;
use signalsmith::builder::engine::BuilderEngine;
use signalsmith::core::http::{create_router, AppState, HealthStatus};
use signalsmith::indicators::registry::IndicatorRegistry;
use signalsmith::metrics::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Test helper wiring the full router around a fresh engine.
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub engine: Arc<BuilderEngine>,
    pub metrics: Arc<Metrics>,
}

impl TestApiServer {
    pub async fn new() -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let engine = Arc::new(
            BuilderEngine::new(Arc::new(IndicatorRegistry::new())).with_metrics(metrics.clone()),
        );
        let state = AppState {
            engine: engine.clone(),
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
        };

        let server = TestServer::new(create_router(state)).expect("start test server");
        Self {
            server,
            engine,
            metrics,
        }
    }
}
