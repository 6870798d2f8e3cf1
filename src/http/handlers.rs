//! Axum HTTP handlers for the web server
//!
//! `/mcp` serves both transports: `GET` opens the event stream, `POST` carries one
//! JSON-RPC request. `/health` reports storage reachability.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{sse::Sse, IntoResponse, Response},
    Json,
};

use crate::domain::health::check as check_health;
use serde_json::Value;

use crate::http::events::ping_stream;
use crate::logging::RpcMethod;
use crate::mcp::{
    rpc::{parse_request, JsonRpcResponse, SERVER_ERROR},
    server::dispatch,
};
use crate::AppState;

pub async fn health(State(state): State<AppState>) -> Response {
    let report = check_health(&state.store).await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report)).into_response()
}

/// Body rejections (oversized or unreadable) are answered in-protocol like any other
/// failure, so the endpoint never replies with a non-JSON error.
pub async fn mcp_endpoint(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let response =
                JsonRpcResponse::error(Value::Null, SERVER_ERROR, rejection.body_text());
            return (StatusCode::OK, Json(response)).into_response();
        }
    };

    let mut rpc_method = None;
    let response = match parse_request(&body) {
        Ok(request) => {
            rpc_method = request.method.clone();
            dispatch(&state, request).await
        }
        Err(error_response) => error_response,
    };

    let mut http_response = (StatusCode::OK, Json(response)).into_response();
    if let Some(method) = rpc_method {
        http_response.extensions_mut().insert(RpcMethod(method));
    }
    http_response
}

pub async fn event_stream(State(state): State<AppState>) -> Response {
    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(ping_stream(state.ping_interval)),
    )
        .into_response()
}
