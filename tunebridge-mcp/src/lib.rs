//! Stdio MCP server in front of the Music tool registry.
//!
//! A host launches `tunebridge` as a child process and exchanges one JSON-RPC
//! message per line with it. [`McpServer`] owns the read loop and the framing
//! rules (parse errors, version check, notifications); [`handlers`] owns the
//! per-method behaviour.

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod transport;

use error::McpError;
use handlers::RequestHandler;
use protocol::{IncomingMessage, JSONRPC_VERSION, JsonRpcResponse, RequestId};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use transport::Transport;
use tunebridge_tools::registry::ToolRegistry;

/// Serves one client over a [`Transport`] until it disconnects.
pub struct McpServer {
    handler: RequestHandler,
}

impl McpServer {
    pub fn new(tool_registry: Arc<ToolRegistry>, server_name: impl Into<String>) -> Self {
        Self {
            handler: RequestHandler::new(tool_registry, server_name),
        }
    }

    /// Read, answer, repeat. Returns once the client closes its side; an
    /// unreadable line is answered with a parse error and skipped.
    pub async fn run<T: Transport>(&mut self, transport: &mut T) -> Result<(), McpError> {
        info!("MCP server starting");

        loop {
            let response = match transport.read_message().await {
                Ok(None) => {
                    info!("Client closed the stream");
                    break;
                }
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    debug!(message = %line, "Received MCP message");
                    self.handle_line(&line).await
                }
                Err(e @ McpError::Parse(_)) => {
                    warn!(error = %e, "Skipping unreadable message");
                    Some(JsonRpcResponse::failure(RequestId::Null, e))
                }
                Err(e) => {
                    error!(error = %e, "Transport read error");
                    break;
                }
            };

            if let Some(response) = response {
                let json = serde_json::to_string(&response)
                    .map_err(|e| McpError::Internal(format!("serialize response: {e}")))?;
                debug!(response = %json, "Sending MCP response");
                transport.write_message(&json).await?;
            }
        }

        transport.close().await?;
        info!("MCP server stopped");
        Ok(())
    }

    /// Answer one raw line. `None` for notifications, which get no reply.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let message: IncomingMessage = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Rejected MCP message");
                return Some(JsonRpcResponse::failure(
                    RequestId::Null,
                    McpError::Parse(format!("Invalid JSON-RPC message: {e}")),
                ));
            }
        };

        if message.jsonrpc != JSONRPC_VERSION {
            warn!(version = %message.jsonrpc, "Rejected MCP message");
            return Some(JsonRpcResponse::failure(
                message.id.unwrap_or(RequestId::Null),
                McpError::InvalidRequest(format!(
                    "Expected jsonrpc version 2.0, got: {}",
                    message.jsonrpc
                )),
            ));
        }

        let Some(id) = message.id else {
            debug!(method = %message.method, "Processing notification");
            if let Err(e) = self.handler.route(&message.method, message.params).await {
                warn!(method = %message.method, error = %e, "Notification handler error");
            }
            return None;
        };

        debug!(method = %message.method, "Processing request");
        Some(match self.handler.route(&message.method, message.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::failure(id, e),
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.handler.is_initialized()
    }
}
