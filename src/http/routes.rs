use super::handlers;
use super::state::AppState;
use super::ws;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/api/start", post(handlers::start_session))
        .route("/api/stop", post(handlers::stop_session))
        .route("/api/status", get(handlers::get_status))
        .route("/api/summary", post(handlers::create_summary))
        // Role-multiplexed WebSocket
        .route("/ws", get(ws::ws_handler));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        // Request logging, then permissive CORS for browser clients
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
