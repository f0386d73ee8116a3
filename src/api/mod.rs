mod error;
mod rest;
mod types;
mod websocket;

pub use error::{ApiError, ApiResult};
pub use rest::RestApi;
pub use types::*;
pub use websocket::websocket_handler;

use crate::engine::TrafficGenerator;
use axum::{routing::get, Router};
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the complete API server: REST, WebSocket, optional `/metrics`
/// and an optional static UI directory as fallback.
pub fn create_api_server(
    generator: TrafficGenerator,
    static_dir: Option<PathBuf>,
    metrics: bool,
) -> Router {
    let rest_api = RestApi::new(generator.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let ws_router = Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(generator);

    let mut app = Router::new().merge(rest_api.router()).merge(ws_router);

    if metrics {
        app = app.route("/metrics", crate::metrics::metrics_route());
    }

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).layer(cors)
}
