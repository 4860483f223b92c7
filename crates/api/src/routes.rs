use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    routing::{get, post},
};
use extract::StatsAnalyzer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};

use crate::metrics::{Metrics, MetricsSnapshot, TimedOperation};

pub struct AppState {
    pub analyzer: StatsAnalyzer,
    pub metrics: Arc<Metrics>,
}

#[derive(Deserialize)]
pub struct PlayerRequest {
    pub player_name: String,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    /// The decoded stats record, or `{"error": "..."}`.
    pub result: Value,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
}

pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Result<Router> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    // Credentials rule out wildcards, so methods and headers are mirrored.
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Ok(Router::new()
        .route("/analyze-player/", post(analyze_player))
        .route("/analyze-player", post(analyze_player))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}

async fn analyze_player(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlayerRequest>,
) -> Json<AnalyzeResponse> {
    let timer = TimedOperation::start();
    let (result, failure) = state.analyzer.player_stats(&req.player_name).await;
    state.metrics.record_analyze(timer.elapsed(), failure.as_ref());

    Json(AnalyzeResponse { result })
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.analyzer.model_name().to_string(),
    })
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
