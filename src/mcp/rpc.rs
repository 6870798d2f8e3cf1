//! JSON-RPC envelope types, request parsing, and error mapping
//!
//! Responses always echo the request `id` verbatim (string, number, or null) and carry
//! exactly one of `result` or `error`.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::errors::AppError;

pub const JSONRPC_VERSION: &str = "2.0";

pub const INVALID_PARAMS: i64 = -32602;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const SERVER_ERROR: i64 = -32000;

#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    pub id: Value,
    pub method: Option<String>,
    pub params: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(RpcError),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl JsonRpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self::error_with_data(id, code, message, None)
    }

    pub fn error_with_data(
        id: Value,
        code: i64,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(RpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }

    pub fn method_not_found(id: Value) -> Self {
        Self::error(id, METHOD_NOT_FOUND, "Method not found")
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}

/// Serialize `value` as the success payload, falling back to a server error.
pub fn result_from<T: Serialize>(id: Value, value: &T) -> JsonRpcResponse {
    match serde_json::to_value(value) {
        Ok(result) => JsonRpcResponse::result(id, result),
        Err(err) => app_error_to_json_rpc(id, AppError::from(err)),
    }
}

pub fn app_error_to_json_rpc(id: Value, err: AppError) -> JsonRpcResponse {
    match err {
        AppError::BadRequest { code, message } => JsonRpcResponse::error_with_data(
            id,
            INVALID_PARAMS,
            "Invalid params",
            Some(json!({
                "code": code,
                "message": message,
                "details": {}
            })),
        ),
        other => {
            tracing::error!(code = other.code(), error = %other, "request failed during dispatch");
            JsonRpcResponse::error(id, SERVER_ERROR, other.to_string())
        }
    }
}

/// Decode a request body. Failures are already shaped as `-32000` responses with a
/// null id, since no id could be recovered.
pub fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|err| JsonRpcResponse::error(Value::Null, SERVER_ERROR, err.to_string()))?;

    let Value::Object(mut object) = payload else {
        return Err(JsonRpcResponse::error(
            Value::Null,
            SERVER_ERROR,
            "request body must be a JSON object",
        ));
    };

    let id = object.remove("id").unwrap_or(Value::Null);
    let method = match object.remove("method") {
        Some(Value::String(method)) => Some(method),
        _ => None,
    };
    let params = match object.remove("params") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(params) => params,
    };

    Ok(JsonRpcRequest { id, method, params })
}
