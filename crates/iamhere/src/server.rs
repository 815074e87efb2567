//! HTTP server startup and routing.

use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    config::Config,
    memory_db::SupportDatabase,
    shared_state::{SharedState, UnifiedAppState},
};

/// Serve until the listener fails. Install tracing first (see `telemetry`).
pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    crate::metrics::init_metrics()?;
    cfg.print_config();

    let database = Arc::new(SupportDatabase::new(&cfg.database_path)?);
    match database.get_stats() {
        Ok(stats) => info!(
            "Database holds {} chats for {} tracked users ({} bytes)",
            stats.total_chats, stats.tracked_users, stats.database_size_bytes
        ),
        Err(e) => warn!("Failed to read database stats: {}", e),
    }

    let addr = cfg.api_addr()?;
    let request_timeout = Duration::from_secs(cfg.request_timeout_seconds);
    let shared_state = Arc::new(SharedState::with_gemini(cfg, database)?);
    let app = build_router(UnifiedAppState::new(shared_state), request_timeout);

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: UnifiedAppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/", get(crate::api::home))
        .route("/chat", post(crate::api::chat))
        .route("/mood-tracking/:user_id", get(crate::api::get_mood_tracking))
        .route("/reset", post(crate::api::reset_chat))
        .route("/health", get(crate::api::health))
        .route("/dashboard/:user_id", get(crate::api::get_dashboard))
        .route("/metrics", get(crate::metrics::get_metrics))
        .layer(middleware::from_fn(count_requests))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

async fn count_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let response = next.run(request).await;
    crate::metrics::inc_request(&route, response.status().as_str());
    response
}
