use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// JSON-RPC method a `POST /mcp` response answered, attached for the request summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcMethod(pub String);

/// Logs once the response head is ready; for event streams that is when the stream opens.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis();
    let rpc_method = response
        .extensions()
        .get::<RpcMethod>()
        .map(|RpcMethod(name)| name.as_str())
        .unwrap_or("-");

    info!(
        method = %method,
        path = %path,
        rpc_method,
        status = status.as_u16(),
        duration_ms = elapsed_ms,
        "request summary"
    );

    if status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            rpc_method,
            status = status.as_u16(),
            "request failed"
        );
    }

    response
}
