//! # Tunebridge Tools
//!
//! Music.app tools for Tunebridge: query sanitization, the `osascript`
//! runner, AppleScript builders, and the tool registry they are served from.

pub mod music;
pub mod registry;
pub mod runner;
pub mod sanitize;
pub mod scripts;

use registry::ToolRegistry;
use runner::ScriptRunner;
use std::sync::Arc;
use tracing::info;
use tunebridge_core::config::MusicConfig;
use tunebridge_core::error::ToolError;

pub use runner::OsascriptRunner;
pub use sanitize::{MAX_QUERY_LEN, sanitize_query};

/// Register every Music tool against a shared script runner.
pub fn register_music_tools(
    registry: &mut ToolRegistry,
    runner: Arc<dyn ScriptRunner>,
    config: &MusicConfig,
) -> Result<(), ToolError> {
    let ctx = music::MusicContext::new(runner, config);
    for tool in music::music_tools(&ctx, config) {
        registry.register(tool)?;
    }
    info!(
        count = registry.len(),
        application = %config.application,
        "Registered Music tools"
    );
    Ok(())
}

/// Build a runner from configuration.
pub fn runner_from_config(config: &MusicConfig) -> Arc<dyn ScriptRunner> {
    Arc::new(OsascriptRunner::new(
        config.osascript_path.clone(),
        config.timeout(),
    ))
}
