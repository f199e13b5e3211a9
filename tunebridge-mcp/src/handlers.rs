//! Method dispatch for one MCP session.

use crate::error::McpError;
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, ListToolsResult,
    MCP_PROTOCOL_VERSION, McpTool, ServerCapabilities, ServerInfo, ToolsCapability,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tunebridge_tools::registry::ToolRegistry;

fn parse_params<T: DeserializeOwned>(method: &str, params: Value) -> Result<T, McpError> {
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(format!("{method}: {e}")))
}

fn to_value(result: impl Serialize) -> Result<Value, McpError> {
    serde_json::to_value(result).map_err(|e| McpError::Internal(e.to_string()))
}

/// Session state plus the shared registry every `tools/*` call goes to.
pub struct RequestHandler {
    registry: Arc<ToolRegistry>,
    server_name: String,
    initialized: bool,
}

impl RequestHandler {
    pub fn new(registry: Arc<ToolRegistry>, server_name: impl Into<String>) -> Self {
        Self {
            registry,
            server_name: server_name.into(),
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Dispatch one method. Notifications go through here too; their
    /// result is discarded by the caller.
    pub async fn route(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
        match method {
            "initialize" => {
                let params = parse_params(method, params)?;
                to_value(self.initialize(params))
            }
            "notifications/initialized" => {
                info!("MCP client ready");
                Ok(Value::Null)
            }
            "notifications/cancelled" => Ok(Value::Null),
            "ping" => Ok(json!({})),
            "tools/list" => {
                self.require_initialized()?;
                to_value(self.list_tools())
            }
            "tools/call" => {
                self.require_initialized()?;
                let params = parse_params(method, params)?;
                to_value(self.call_tool(params).await?)
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    fn require_initialized(&self) -> Result<(), McpError> {
        if self.initialized {
            Ok(())
        } else {
            Err(McpError::NotInitialized)
        }
    }

    fn initialize(&mut self, params: InitializeParams) -> InitializeResult {
        info!(
            client = %params.client_info.name,
            client_version = params.client_info.version.as_deref().unwrap_or("unknown"),
            requested_protocol = %params.protocol_version,
            "MCP client connecting"
        );
        self.initialized = true;
        InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION,
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }

    fn list_tools(&self) -> ListToolsResult {
        let tools = self
            .registry
            .list_definitions()
            .into_iter()
            .map(|def| McpTool {
                name: def.name,
                description: def.description,
                input_schema: def.parameters,
            })
            .collect();
        ListToolsResult { tools }
    }

    /// Unknown names are a protocol error; anything that goes wrong inside a
    /// known tool is reported in the result as `Error: <description>`.
    async fn call_tool(&self, params: CallToolParams) -> Result<CallToolResult, McpError> {
        if self.registry.get(&params.name).is_none() {
            return Err(McpError::UnknownTool(params.name));
        }
        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        debug!(tool = %params.name, args = %arguments, "tools/call");

        match self.registry.execute(&params.name, arguments).await {
            Ok(output) => Ok(CallToolResult::text(output.content)),
            Err(e) => {
                warn!(tool = %params.name, error = %e, "Tool call failed");
                Ok(CallToolResult::error(format!("Error: {e}")))
            }
        }
    }
}
