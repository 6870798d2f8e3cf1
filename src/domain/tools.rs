//! Tool registry and invocation
//!
//! The registry is static: three tools are advertised through `tools/list`. Execution is
//! delegated to `ToolHandler` implementations registered at startup; a tool without a
//! handler is discoverable but not executable.

use std::{any::Any, collections::HashMap, panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use futures_util::FutureExt;
use rust_mcp_sdk::schema::{CallToolRequestParams, CallToolResult, ContentBlock, TextContent};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::errors::AppError;
use crate::mcp::rpc::{
    app_error_to_json_rpc, result_from, JsonRpcResponse, INVALID_PARAMS, METHOD_NOT_FOUND,
    SERVER_ERROR,
};
use crate::storage::Store;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    RunAgentTask,
    ExecuteWorkflow,
    RunCommand,
}

impl ToolName {
    pub const ALL: [ToolName; 3] = [
        ToolName::RunAgentTask,
        ToolName::ExecuteWorkflow,
        ToolName::RunCommand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::RunAgentTask => "run_agent_task",
            ToolName::ExecuteWorkflow => "execute_workflow",
            ToolName::RunCommand => "run_command",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    fn description(&self) -> &'static str {
        match self {
            ToolName::RunAgentTask => "Execute an agent task",
            ToolName::ExecuteWorkflow => "Execute a workflow",
            ToolName::RunCommand => "Execute a system command",
        }
    }

    fn input_schema(&self) -> Value {
        let properties = match self {
            ToolName::RunAgentTask => json!({
                "task": {"type": "string"},
                "input": {"type": "string"},
                "tool": {"type": "string"}
            }),
            ToolName::ExecuteWorkflow => json!({
                "workflow_id": {"type": "string"},
                "inputs": {"type": "object"}
            }),
            ToolName::RunCommand => json!({
                "command": {"type": "string"},
                "args": {"type": "array"}
            }),
        };

        json!({
            "type": "object",
            "properties": properties
        })
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.as_str(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Serialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDescriptor>,
}

pub fn list_tools() -> Vec<ToolDescriptor> {
    ToolName::ALL.iter().map(ToolName::descriptor).collect()
}

fn default_agent_tool() -> String {
    "gpt4".to_string()
}

fn default_agent_context() -> String {
    "internal".to_string()
}

fn default_workflow_trigger() -> String {
    "n8n".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentTask {
    pub task: String,
    pub input: String,
    #[serde(default = "default_agent_tool")]
    pub tool: String,
    #[serde(default = "default_agent_context")]
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkflowRequest {
    pub workflow_id: String,
    #[serde(default = "default_workflow_trigger")]
    pub trigger: String,
    #[serde(default)]
    pub inputs: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecCommand {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<String>,
}

/// Decoded arguments, one variant per registered tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArguments {
    AgentTask(AgentTask),
    Workflow(WorkflowRequest),
    Command(ExecCommand),
}

impl ToolArguments {
    pub fn decode(tool: ToolName, arguments: Value) -> Result<Self, AppError> {
        if !arguments.is_object() {
            return Err(AppError::bad_request(
                "invalid_arguments",
                "tool arguments must be a JSON object",
            ));
        }

        Ok(match tool {
            ToolName::RunAgentTask => Self::AgentTask(decode_as(tool, arguments)?),
            ToolName::ExecuteWorkflow => Self::Workflow(decode_as(tool, arguments)?),
            ToolName::RunCommand => Self::Command(decode_as(tool, arguments)?),
        })
    }
}

fn decode_as<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, AppError> {
    serde_json::from_value(arguments).map_err(|err| {
        AppError::bad_request(
            "invalid_arguments",
            format!("invalid {} arguments: {err}", tool.as_str()),
        )
    })
}

/// A key/value pair destined for the memory table.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryItem {
    pub key: String,
    pub value: Value,
}

impl MemoryItem {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// What a handler gets to work with besides its arguments.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub store: Store,
}

impl ToolContext {
    pub async fn remember(&self, item: MemoryItem) -> Result<(), AppError> {
        self.store
            .blocking(move |store| store.set(&item.key, &item.value))
            .await
    }

    pub async fn recall(&self, key: impl Into<String>) -> Result<Option<Value>, AppError> {
        let key = key.into();
        self.store.blocking(move |store| store.get(&key)).await
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, ctx: &ToolContext, arguments: ToolArguments) -> Result<Value, AppError>;
}

#[derive(Clone, Default)]
pub struct ToolHandlers {
    handlers: HashMap<ToolName, Arc<dyn ToolHandler>>,
}

impl ToolHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: ToolName, handler: Arc<dyn ToolHandler>) -> Self {
        self.handlers.insert(name, handler);
        self
    }

    pub fn get(&self, name: ToolName) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(&name).cloned()
    }

    pub fn is_executable(&self, name: ToolName) -> bool {
        self.handlers.contains_key(&name)
    }
}

/// Decode arguments, run a registered handler, and wrap its value as an MCP tool result.
/// A panicking handler is reported as a server error instead of tearing down the request.
pub async fn invoke_tool(
    state: &AppState,
    id: Value,
    handler: Arc<dyn ToolHandler>,
    tool: ToolName,
    arguments: Value,
) -> JsonRpcResponse {
    let arguments = match ToolArguments::decode(tool, arguments) {
        Ok(arguments) => arguments,
        Err(err) => return app_error_to_json_rpc(id, err),
    };
    let ctx = ToolContext {
        store: state.store.clone(),
    };

    let outcome = AssertUnwindSafe(handler.call(&ctx, arguments))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(value)) => {
            info!(tool = tool.as_str(), "tool invocation completed");
            let structured_content = match value {
                Value::Object(map) => map,
                other => Map::from_iter([("value".to_string(), other)]),
            };
            result_from(
                id,
                &CallToolResult {
                    content: vec![ContentBlock::from(TextContent::new(
                        format!("{} completed", tool.as_str()),
                        None,
                        None,
                    ))],
                    is_error: None,
                    meta: None,
                    structured_content: Some(structured_content),
                },
            )
        }
        Ok(Err(err)) => app_error_to_json_rpc(id, err),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(tool = tool.as_str(), panic = %message, "tool handler panicked");
            JsonRpcResponse::error(id, SERVER_ERROR, message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|text| text.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());

    match detail {
        Some(detail) => format!("tool handler panicked: {detail}"),
        None => "tool handler panicked".to_string(),
    }
}

pub async fn handle_tools_call(state: &AppState, id: Value, params: Value) -> JsonRpcResponse {
    let tool_call: CallToolRequestParams = match serde_json::from_value(params) {
        Ok(value) => value,
        Err(_) => return JsonRpcResponse::error(id, INVALID_PARAMS, "Invalid params"),
    };

    let Some(tool) = ToolName::parse(&tool_call.name) else {
        return JsonRpcResponse::error_with_data(
            id,
            METHOD_NOT_FOUND,
            "Method not found",
            Some(json!({
                "code": "tool_not_found",
                "message": "unknown tool name",
                "details": {
                    "name": tool_call.name,
                },
            })),
        );
    };

    let Some(handler) = state.tools.get(tool) else {
        return JsonRpcResponse::error_with_data(
            id,
            METHOD_NOT_FOUND,
            "Method not found",
            Some(json!({
                "code": "tool_not_executable",
                "message": "tool is registered but has no handler",
                "details": {
                    "name": tool.as_str(),
                },
            })),
        );
    };

    invoke_tool(
        state,
        id,
        handler,
        tool,
        Value::Object(tool_call.arguments.unwrap_or_default()),
    )
    .await
}
