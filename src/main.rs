//! Signalsmith bot service
//!
//! Hosts the condition-builder engine behind the HTTP event bridge and
//! the mini-app submission endpoint. The chat transport runs as an
//! external adapter against `/bot/events`.

use dotenvy::dotenv;
use signalsmith::builder::engine::BuilderEngine;
use signalsmith::config::Config;
use signalsmith::core::http::start_server;
use signalsmith::indicators::registry::IndicatorRegistry;
use signalsmith::logging;
use signalsmith::metrics::Metrics;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env();
    info!("Starting Signalsmith bot service");
    info!(environment = %config.environment, "Environment");
    info!(port = config.http_port, "HTTP server: http://0.0.0.0:{}", config.http_port);

    let metrics = Arc::new(Metrics::new()?);
    let registry = Arc::new(IndicatorRegistry::new());
    let engine = Arc::new(BuilderEngine::new(registry).with_metrics(metrics.clone()));

    let port = config.http_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, engine, metrics).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down bot service");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
