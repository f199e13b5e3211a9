//! Error types for Tunebridge.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering tool execution, script invocation, and configuration.

/// Errors from tool registration and execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Tool already registered: {name}")]
    AlreadyRegistered { name: String },

    #[error("Invalid arguments for tool '{name}': {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("Tool '{name}' execution failed: {message}")]
    ExecutionFailed { name: String, message: String },

    #[error("Tool '{name}' timed out after {timeout_secs}s")]
    Timeout { name: String, timeout_secs: u64 },
}

/// Errors from running a script through the external interpreter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// The interpreter exited with a non-zero status.
    #[error("AppleScript error: {stderr}")]
    Failed { stderr: String },

    /// The interpreter did not finish within the configured bound.
    #[error("AppleScript execution timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The interpreter could not be started or waited on.
    #[error("Failed to run osascript: {message}")]
    Spawn { message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration load error: {0}")]
    Load(#[from] Box<figment::Error>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::NotFound {
            name: "itunes_rewind".into(),
        };
        assert_eq!(err.to_string(), "Tool not found: itunes_rewind");

        let err = ToolError::InvalidArguments {
            name: "itunes_search".into(),
            reason: "missing required 'query' parameter".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid arguments for tool 'itunes_search': missing required 'query' parameter"
        );
    }

    #[test]
    fn test_script_error_display() {
        assert_eq!(
            ScriptError::Failed {
                stderr: "execution error: Music got an error (-1728)".into()
            }
            .to_string(),
            "AppleScript error: execution error: Music got an error (-1728)"
        );
        assert_eq!(
            ScriptError::Timeout { timeout_secs: 30 }.to_string(),
            "AppleScript execution timed out after 30s"
        );
        assert_eq!(
            ScriptError::Spawn {
                message: "No such file or directory".into()
            }
            .to_string(),
            "Failed to run osascript: No such file or directory"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            message: "music.timeout_secs must be greater than zero".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: music.timeout_secs must be greater than zero"
        );
    }
}
