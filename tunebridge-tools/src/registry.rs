//! Name-to-tool table built once by the composition root and shared
//! read-only with the server afterwards.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tunebridge_core::error::ToolError;
use tunebridge_core::types::{RiskLevel, ToolDefinition, ToolOutput};

/// A callable tool: one MCP-visible name backed by one AppleScript run.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the arguments object.
    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError>;

    fn risk_level(&self) -> RiskLevel;

    /// Upper bound on a single `execute`, enforced by the registry.
    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }
}

/// Registered tools keyed by name. Iteration order is name order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tool`; a second tool with the same name is rejected.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::AlreadyRegistered { name });
        }
        debug!(tool = %name, risk = %tool.risk_level(), "Registering tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools.remove(name).ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
                risk_level: tool.risk_level(),
            })
            .collect()
    }

    pub fn list_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the named tool, cutting it off after its own [`Tool::timeout`].
    pub async fn execute(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
        })?;
        let limit = tool.timeout();
        let started = Instant::now();

        let result = tokio::time::timeout(limit, tool.execute(args))
            .await
            .unwrap_or_else(|_| {
                Err(ToolError::Timeout {
                    name: name.to_string(),
                    timeout_secs: limit.as_secs(),
                })
            });

        info!(
            tool = %name,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tool finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{MusicContext, ScriptedTool, SearchTool};
    use crate::runner::ScriptRunner;
    use crate::scripts::Transport;
    use serde_json::json;
    use tunebridge_core::config::MusicConfig;
    use tunebridge_core::error::ScriptError;

    /// Answers every script with the same library line.
    struct LibraryRunner;

    #[async_trait]
    impl ScriptRunner for LibraryRunner {
        async fn run(&self, _script: &str) -> Result<String, ScriptError> {
            Ok("Total tracks: 3\nTotal playlists: 1".to_string())
        }
    }

    /// Never answers, like a Music.app stuck behind a modal dialog.
    struct StuckRunner;

    #[async_trait]
    impl ScriptRunner for StuckRunner {
        async fn run(&self, _script: &str) -> Result<String, ScriptError> {
            std::future::pending().await
        }
    }

    fn context(runner: impl ScriptRunner + 'static) -> MusicContext {
        MusicContext::new(Arc::new(runner), &MusicConfig::default())
    }

    fn pause_tool(ctx: MusicContext) -> Arc<dyn Tool> {
        Arc::new(ScriptedTool::transport(
            ctx,
            "itunes_pause",
            "Pause playback.",
            Transport::Pause,
        ))
    }

    #[test]
    fn test_registry_new() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.list_definitions().is_empty());
    }

    #[test]
    fn test_register_duplicate() {
        let ctx = context(LibraryRunner);
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(ScriptedTool::library(ctx.clone())))
            .unwrap();

        match registry.register(Arc::new(ScriptedTool::library(ctx))) {
            Err(ToolError::AlreadyRegistered { name }) => assert_eq!(name, "itunes_library"),
            other => panic!("Expected AlreadyRegistered, got: {:?}", other.err()),
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_returns_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(pause_tool(context(LibraryRunner))).unwrap();

        let removed = registry.unregister("itunes_pause").unwrap();
        assert_eq!(removed.name(), "itunes_pause");
        assert!(registry.get("itunes_pause").is_none());
        assert!(matches!(
            registry.unregister("itunes_pause"),
            Err(ToolError::NotFound { .. })
        ));
    }

    #[test]
    fn test_definitions_are_name_ordered_and_carry_risk() {
        let ctx = context(LibraryRunner);
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SearchTool::new(ctx.clone()))).unwrap();
        registry.register(pause_tool(ctx.clone())).unwrap();
        registry.register(Arc::new(ScriptedTool::library(ctx))).unwrap();

        assert_eq!(
            registry.list_names(),
            vec!["itunes_library", "itunes_pause", "itunes_search"]
        );
        let defs = registry.list_definitions();
        let risks: Vec<RiskLevel> = defs.iter().map(|d| d.risk_level).collect();
        assert_eq!(
            risks,
            vec![RiskLevel::ReadOnly, RiskLevel::Write, RiskLevel::ReadOnly]
        );
        assert_eq!(defs[2].parameters["required"], json!(["query"]));
    }

    #[tokio::test]
    async fn test_execute_returns_script_output() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(ScriptedTool::library(context(LibraryRunner))))
            .unwrap();

        let output = registry.execute("itunes_library", json!({})).await.unwrap();
        assert_eq!(output.content, "Total tracks: 3\nTotal playlists: 1");
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        match registry.execute("itunes_shuffle", json!({})).await {
            Err(ToolError::NotFound { name }) => assert_eq!(name, "itunes_shuffle"),
            other => panic!("Expected NotFound, got: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_times_out_stuck_script() {
        let mut registry = ToolRegistry::new();
        registry.register(pause_tool(context(StuckRunner))).unwrap();

        match registry.execute("itunes_pause", json!({})).await {
            Err(ToolError::Timeout { name, timeout_secs }) => {
                assert_eq!(name, "itunes_pause");
                assert_eq!(timeout_secs, 35);
            }
            other => panic!("Expected Timeout, got: {:?}", other),
        }
    }
}
