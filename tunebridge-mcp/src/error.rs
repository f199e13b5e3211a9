//! Errors raised while serving a session, each mapped to a JSON-RPC code.

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// The line was not a JSON-RPC message at all.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// A tools method arrived before `initialize`.
    #[error("Server not initialized")]
    NotInitialized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// JSON-RPC error code sent to the client.
    pub fn code(&self) -> i64 {
        match self {
            McpError::Parse(_) => -32700,
            McpError::InvalidRequest(_) => -32600,
            McpError::MethodNotFound(_) => -32601,
            McpError::InvalidParams(_) => -32602,
            McpError::Internal(_) | McpError::Io(_) => -32603,
            McpError::UnknownTool(_) => -32000,
            McpError::Transport(_) => -32002,
            McpError::NotInitialized => -32003,
        }
    }
}
