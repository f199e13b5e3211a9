//! CLI subcommand handlers.

use crate::{Cli, Commands};
use std::sync::Arc;
use tracing::info;
use tunebridge_core::BridgeConfig;
use tunebridge_core::types::ToolDefinition;
use tunebridge_mcp::McpServer;
use tunebridge_mcp::transport::StdioTransport;
use tunebridge_tools::registry::ToolRegistry;

/// Handle a CLI subcommand against the validated configuration.
pub async fn handle_command(command: Commands, config: BridgeConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve => handle_serve(config).await,
        Commands::Tools => handle_tools(&config),
        Commands::Config => handle_config(&config),
    }
}

/// Apply command-line overrides on top of the loaded configuration.
pub(crate) fn apply_overrides(config: &mut BridgeConfig, cli: &Cli) {
    if let Some(app) = &cli.app {
        config.music.application = app.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.music.timeout_secs = timeout;
    }
}

/// Build the tool registry for `config`, backed by the real `osascript` runner.
pub(crate) fn build_registry(config: &BridgeConfig) -> anyhow::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    let runner = tunebridge_tools::runner_from_config(&config.music);
    tunebridge_tools::register_music_tools(&mut registry, runner, &config.music)?;
    Ok(registry)
}

async fn handle_serve(config: BridgeConfig) -> anyhow::Result<()> {
    let registry = Arc::new(build_registry(&config)?);
    info!(
        server = %config.server_name,
        application = %config.music.application,
        tools = registry.len(),
        "Starting MCP server on stdio"
    );

    let mut server = McpServer::new(registry, config.server_name);
    let mut transport = StdioTransport::stdio();
    server.run(&mut transport).await?;
    Ok(())
}

fn handle_tools(config: &BridgeConfig) -> anyhow::Result<()> {
    let registry = build_registry(config)?;
    for def in registry.list_definitions() {
        println!("{}", tool_line(&def));
    }
    Ok(())
}

/// One row of `tunebridge tools`: name, risk, description.
pub(crate) fn tool_line(def: &ToolDefinition) -> String {
    format!("{:<24} {:<9} {}", def.name, def.risk_level, def.description)
}

fn handle_config(config: &BridgeConfig) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_filter;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::parse_from(["tunebridge"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tunebridge", "tools", "-vv", "--app", "iTunes"]);
        assert_eq!(cli.command, Some(Commands::Tools));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.app.as_deref(), Some("iTunes"));
    }

    #[test]
    fn test_rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["tunebridge", "--timeout", "soon"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from(["tunebridge", "--app", "iTunes", "--timeout", "5"]);
        let mut config = BridgeConfig::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.music.application, "iTunes");
        assert_eq!(config.music.timeout_secs, 5);
        assert_eq!(config.music.osascript_path, "osascript");
    }

    #[test]
    fn test_apply_overrides_without_flags_keeps_config() {
        let cli = Cli::parse_from(["tunebridge", "serve"]);
        let mut config = BridgeConfig::default();
        config.music.application = "Swinsian".into();
        let before = config.clone();
        apply_overrides(&mut config, &cli);
        assert_eq!(config, before);
    }

    #[test]
    fn test_zero_timeout_override_fails_validation() {
        let cli = Cli::parse_from(["tunebridge", "--timeout", "0"]);
        let mut config = BridgeConfig::default();
        apply_overrides(&mut config, &cli);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0, false), "info");
        assert_eq!(log_filter(0, true), "error");
        assert_eq!(log_filter(1, true), "debug");
        assert_eq!(log_filter(3, false), "trace");
    }

    #[test]
    fn test_build_registry() {
        let registry = build_registry(&BridgeConfig::default()).unwrap();
        assert_eq!(registry.len(), 10);
        assert!(registry.get("itunes_all_songs").is_some());
    }

    #[test]
    fn test_tool_lines_show_risk() {
        let registry = build_registry(&BridgeConfig::default()).unwrap();
        let lines: Vec<String> = registry.list_definitions().iter().map(tool_line).collect();
        let pause = lines.iter().find(|l| l.starts_with("itunes_pause ")).unwrap();
        assert!(pause.starts_with(&format!("{:<24} write     ", "itunes_pause")));
        let search = lines.iter().find(|l| l.starts_with("itunes_search ")).unwrap();
        assert!(search.contains(" read-only Search the Music library"));
    }

    #[test]
    fn test_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&BridgeConfig::default()).unwrap();
        assert!(rendered.contains("server_name = \"iTunesControlServer\""));
        assert!(rendered.contains("[music]"));
        assert!(rendered.contains("timeout_secs = 30"));
    }
}
