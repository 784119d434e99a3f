//! HTTP endpoint server using Axum
//!
//! Hosts the mini-app submission path, the transport event bridge, and
//! the operational endpoints. The chat adapter itself runs elsewhere and
//! talks to `/bot/events`.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::builder::engine::BuilderEngine;
use crate::metrics::Metrics;
use crate::models::strategy::Strategy;
use crate::transport::{Action, Event, UserId};
use crate::webapp;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BuilderEngine>,
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "signalsmith-bot"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    state.metrics.http_requests_in_flight.dec();
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(start.elapsed().as_secs_f64());
    response
}

/// Mini-app form submission: parse and acknowledge in one turn.
async fn webapp_submit(Json(fields): Json<HashMap<String, Value>>) -> (StatusCode, Json<Value>) {
    match webapp::parse_submission(&fields) {
        Ok(submission) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "ack": webapp::ack_text(&submission) })),
        ),
        Err(error) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "status": "error", "error": error.to_string() })),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct InboundEvent {
    user_id: UserId,
    #[serde(flatten)]
    event: Event,
}

#[derive(Debug, Serialize)]
struct EventReply {
    actions: Vec<Action>,
}

/// Bridge for an external chat adapter: inject one inbound event and
/// collect the outbound actions for the same user.
async fn bot_event(
    State(state): State<AppState>,
    Json(inbound): Json<InboundEvent>,
) -> Json<EventReply> {
    let actions = state.engine.handle_event(inbound.user_id, inbound.event).await;
    Json(EventReply { actions })
}

/// Machine-readable strategy snapshot.
async fn get_strategy(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Json<Strategy> {
    Json(state.engine.strategy(user_id).await)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/webapp/submit", post(webapp_submit))
        .route("/bot/events", post(bot_event))
        .route("/bot/strategies/{user_id}", get(get_strategy))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    engine: Arc<BuilderEngine>,
    metrics: Arc<Metrics>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState {
        engine,
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time: Arc::new(Instant::now()),
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
