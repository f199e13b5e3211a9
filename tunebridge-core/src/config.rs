//! Configuration system for Tunebridge.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! explicit config file -> environment. The user config lives at
//! `~/.config/tunebridge/config.toml` (platform equivalent via `directories`).

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name reported to MCP clients in `serverInfo`.
    pub server_name: String,
    pub music: MusicConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server_name: "iTunesControlServer".to_string(),
            music: MusicConfig::default(),
        }
    }
}

/// Settings for the Music.app scripting bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    /// Target application in `tell application "..."` blocks.
    pub application: String,
    /// Interpreter invoked as `<osascript_path> -e <script>`.
    pub osascript_path: String,
    /// Upper bound on a single script run.
    pub timeout_secs: u64,
    /// Number of tracks returned by the full-library listing.
    pub library_listing_limit: u32,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            application: "Music".to_string(),
            osascript_path: "osascript".to_string(),
            timeout_secs: 30,
            library_listing_limit: 100,
        }
    }
}

impl MusicConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BridgeConfig {
    /// Reject values the bridge cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "server_name must not be empty".into(),
            });
        }
        if self.music.application.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "music.application must not be empty".into(),
            });
        }
        if self.music.application.contains('"') {
            return Err(ConfigError::Invalid {
                message: "music.application must not contain double quotes".into(),
            });
        }
        if self.music.osascript_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "music.osascript_path must not be empty".into(),
            });
        }
        if self.music.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "music.timeout_secs must be greater than zero".into(),
            });
        }
        if self.music.library_listing_limit == 0 {
            return Err(ConfigError::Invalid {
                message: "music.library_listing_limit must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

/// Path of the user-level config file, if a home directory can be resolved.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "tunebridge", "tunebridge")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `TUNEBRIDGE_`, nested with `__`)
/// 2. Explicit config file (`--config`)
/// 3. User config (`~/.config/tunebridge/config.toml`)
/// 4. Built-in defaults
pub fn load_config(explicit: Option<&Path>) -> Result<BridgeConfig, ConfigError> {
    load_layered(user_config_path().as_deref(), explicit)
}

fn load_layered(
    user_config: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<BridgeConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(BridgeConfig::default()));

    if let Some(path) = user_config {
        if path.exists() {
            tracing::debug!(path = %path.display(), "Merging user config");
            figment = figment.merge(Toml::file(path));
        }
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::Invalid {
                message: format!("config file not found: {}", path.display()),
            });
        }
        tracing::debug!(path = %path.display(), "Merging explicit config");
        figment = figment.merge(Toml::file(path));
    }

    // TUNEBRIDGE_MUSIC__TIMEOUT_SECS, TUNEBRIDGE_SERVER_NAME, etc.
    figment = figment.merge(Env::prefixed("TUNEBRIDGE_").split("__"));

    let config: BridgeConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
