mod config;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::{AppConfig, LogFormat};
use metrics::Metrics;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    extract::load_dotenv();

    // Missing credentials stop the process before anything is served
    let config = AppConfig::from_env()?;

    init_tracing(config.log_format);
    tracing::info!(
        model = %config.model.model,
        span_strategy = ?config.span_strategy,
        origins = ?config.server.allowed_origins,
        "Starting CricAI stats service"
    );

    let client = extract::GeminiClient::from_config(&config.model)?;
    let analyzer = extract::gemini_analyzer(client, config.span_strategy);

    let state = Arc::new(AppState {
        analyzer,
        metrics: Metrics::new(),
    });

    let app = routes::build_router(state, &config.server.allowed_origins)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;

    tracing::info!("Server listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
