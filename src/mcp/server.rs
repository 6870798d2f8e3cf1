//! The central Model Context Protocol engine
//!
//! Maps a decoded JSON-RPC request onto a closed set of methods and produces exactly one
//! response per request. Failures never escape: they come back as JSON-RPC errors.

use serde_json::Value;
use tracing::info;

use crate::domain::tools::{handle_tools_call, invoke_tool, list_tools, ToolName, ToolsListResult};
use crate::mcp::rpc::{result_from, JsonRpcRequest, JsonRpcResponse};
use crate::AppState;

/// Everything outside this set, `initialize` and `ping` included, is answered with
/// `-32601`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    ToolsList,
    ToolsCall,
    /// A registered tool invoked directly by its name.
    Tool(ToolName),
    Unknown(String),
}

impl Method {
    pub fn parse(name: &str) -> Self {
        match name {
            "tools/list" => Method::ToolsList,
            "tools/call" => Method::ToolsCall,
            other => ToolName::parse(other)
                .map(Method::Tool)
                .unwrap_or_else(|| Method::Unknown(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::ToolsList => "tools/list",
            Method::ToolsCall => "tools/call",
            Method::Tool(tool) => tool.as_str(),
            Method::Unknown(name) => name.as_str(),
        }
    }
}

pub async fn dispatch(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let JsonRpcRequest { id, method, params } = request;
    let audit_params = redact_audit_value(&params);
    let method = method
        .as_deref()
        .map(Method::parse)
        .unwrap_or_else(|| Method::Unknown(String::new()));

    let response = match &method {
        Method::ToolsList => result_from(id, &ToolsListResult { tools: list_tools() }),
        Method::ToolsCall => handle_tools_call(state, id, params).await,
        Method::Tool(tool) => match state.tools.get(*tool) {
            Some(handler) => invoke_tool(state, id, handler, *tool, params).await,
            None => {
                info!(tool = tool.as_str(), "tool is registered but not executable");
                JsonRpcResponse::method_not_found(id)
            }
        },
        Method::Unknown(_) => JsonRpcResponse::method_not_found(id),
    };

    info!(
        method = %method.as_str(),
        params = %audit_params,
        outcome = if response.is_error() { "failure" } else { "success" },
        "mcp action audited"
    );

    response
}

pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    let item = if is_sensitive_key(key) {
                        Value::String("[REDACTED]".to_string())
                    } else {
                        redact_audit_value(item)
                    };
                    (key.clone(), item)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    ["token", "secret", "password", "credential", "api_key", "apikey", "authorization"]
        .iter()
        .any(|marker| normalized.contains(marker))
}
