//! Script invocation: runs AppleScript source through `osascript` with a
//! fixed timeout and reports stdout, stderr, timeouts, or spawn failures.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};
use tunebridge_core::error::ScriptError;

/// Executes a complete script and returns its captured output.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &str) -> Result<String, ScriptError>;
}

/// Strip user home directory paths from interpreter errors before they are
/// returned to an MCP client.
pub(crate) fn sanitize_error_message(msg: &str) -> String {
    let mut result = msg.to_string();
    for prefix in ["/Users/", "/home/"] {
        while let Some(start) = result.find(prefix) {
            let after = start + prefix.len();
            match result[after..].find('/') {
                Some(slash_pos) => result.replace_range(start..after + slash_pos + 1, "~/"),
                None => break,
            }
        }
    }
    result
}

/// Runs scripts as `<program> -e <script>`.
#[derive(Debug, Clone)]
pub struct OsascriptRunner {
    program: String,
    timeout: Duration,
}

impl OsascriptRunner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for OsascriptRunner {
    fn default() -> Self {
        Self::new("osascript", Duration::from_secs(30))
    }
}

#[async_trait]
impl ScriptRunner for OsascriptRunner {
    async fn run(&self, script: &str) -> Result<String, ScriptError> {
        debug!(program = %self.program, bytes = script.len(), "Running script");

        let child = Command::new(&self.program)
            .arg("-e")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ScriptError::Spawn {
                message: e.to_string(),
            })?;

        // Dropping the wait future on timeout kills the child.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ScriptError::Spawn {
                message: e.to_string(),
            })?,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Script timed out");
                return Err(ScriptError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(status = ?output.status.code(), "Script exited with failure");
            Err(ScriptError::Failed {
                stderr: sanitize_error_message(&stderr),
            })
        }
    }
}
