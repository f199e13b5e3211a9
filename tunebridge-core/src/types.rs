//! Core type definitions shared by the tool layer and the MCP server.

use serde::{Deserialize, Serialize};

/// How a tool affects the player or the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    /// Listing or searching the library.
    ReadOnly,
    /// Changing playback state or creating playlists.
    Write,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            RiskLevel::ReadOnly => "read-only",
            RiskLevel::Write => "write",
        })
    }
}

/// Everything a client needs to know to call a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
    pub risk_level: RiskLevel,
}

/// Text produced by a successful tool run, passed to the client unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: String,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}
