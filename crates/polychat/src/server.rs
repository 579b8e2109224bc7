use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::config::Config;
use crate::handlers;
use crate::llm::ProviderRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub providers: Arc<ProviderRegistry>,
    /// Longest gap allowed between provider stream events.
    pub idle_timeout_seconds: u64,
    pub keep_alive_interval_seconds: u64,
    /// Completion cap forwarded to every provider; `None` keeps provider defaults.
    pub max_tokens: Option<u32>,
}

impl AppState {
    pub fn new(providers: ProviderRegistry, config: &Config) -> Self {
        Self {
            providers: Arc::new(providers),
            idle_timeout_seconds: config.server.idle_timeout_seconds,
            keep_alive_interval_seconds: config.server.keep_alive_interval_seconds,
            max_tokens: config.server.max_tokens,
        }
    }
}

pub fn build_app(state: AppState, request_timeout_secs: u64) -> Router {
    let api = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/providers", get(handlers::list_providers))
        .with_state(state.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .with_state(state)
        .nest("/api", api)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_secs),
        ))
        .layer(cors)
}

/// Run the relay until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let registry = ProviderRegistry::from_env(&config.providers, &config.gateway);
    let state = AppState::new(registry, &config);
    let app = build_app(state, config.server.request_timeout_seconds);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "polychat relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("polychat relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
