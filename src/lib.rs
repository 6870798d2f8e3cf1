use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod storage;

use domain::tools::ToolHandlers;
use storage::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub tools: ToolHandlers,
    pub ping_interval: Duration,
}

impl AppState {
    pub fn new(store: Store, tools: ToolHandlers, ping_interval: Duration) -> Self {
        Self {
            store,
            tools,
            ping_interval,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    // Any origin, method, and header is accepted; narrow this before exposing the port.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/mcp",
            get(http::handlers::event_stream).post(http::handlers::mcp_endpoint),
        )
        .route("/health", get(http::handlers::health))
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
