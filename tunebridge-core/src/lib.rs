//! # Tunebridge Core
//!
//! Shared building blocks for Tunebridge: the tool output and definition
//! types, the error enums used across the workspace, and layered
//! configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{BridgeConfig, MusicConfig, load_config};
pub use error::{ConfigError, ScriptError, ToolError};
pub use types::{RiskLevel, ToolDefinition, ToolOutput};
