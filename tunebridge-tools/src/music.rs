//! Music.app tools: playback control, search, playlist creation, and library
//! summaries, each backed by a single AppleScript run.

use crate::registry::Tool;
use crate::runner::ScriptRunner;
use crate::sanitize::sanitize_query;
use crate::scripts::{self, Transport};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tunebridge_core::config::MusicConfig;
use tunebridge_core::error::ToolError;
use tunebridge_core::types::{RiskLevel, ToolOutput};

/// Grace period on top of the runner timeout so the runner reports first.
const TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Shared state for every Music tool: the runner and the target application.
#[derive(Clone)]
pub struct MusicContext {
    runner: Arc<dyn ScriptRunner>,
    application: String,
    timeout: Duration,
}

impl MusicContext {
    pub fn new(runner: Arc<dyn ScriptRunner>, config: &MusicConfig) -> Self {
        Self {
            runner,
            application: config.application.clone(),
            timeout: config.timeout() + TIMEOUT_GRACE,
        }
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    async fn run(&self, tool_name: &str, script: &str) -> Result<ToolOutput, ToolError> {
        let output = self
            .runner
            .run(script)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                name: tool_name.to_string(),
                message: e.to_string(),
            })?;
        Ok(ToolOutput::text(output))
    }
}

/// Helper to extract a required string argument.
pub(crate) fn require_str<'a>(
    args: &'a serde_json::Value,
    field: &str,
    tool_name: &str,
) -> Result<&'a str, ToolError> {
    args[field]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments {
            name: tool_name.to_string(),
            reason: format!("missing required '{}' parameter", field),
        })
}

fn no_arguments_schema() -> serde_json::Value {
    json!({ "type": "object", "properties": {} })
}

// ── Fixed-script tools ──────────────────────────────────────────────────────

/// A tool that takes no arguments and always runs the same script.
pub struct ScriptedTool {
    name: &'static str,
    description: &'static str,
    risk: RiskLevel,
    script: String,
    ctx: MusicContext,
}

impl ScriptedTool {
    pub fn transport(
        ctx: MusicContext,
        name: &'static str,
        description: &'static str,
        command: Transport,
    ) -> Self {
        Self {
            name,
            description,
            risk: RiskLevel::Write,
            script: scripts::transport(ctx.application(), command),
            ctx,
        }
    }

    pub fn library(ctx: MusicContext) -> Self {
        Self {
            name: "itunes_library",
            description: "Return a summary of the Music library, including total tracks and user playlists.",
            risk: RiskLevel::ReadOnly,
            script: scripts::library_summary(ctx.application()),
            ctx,
        }
    }

    pub fn current_song(ctx: MusicContext) -> Self {
        Self {
            name: "itunes_current_song",
            description: "Get information about the currently playing track. \
                          Returns the track name, artist, and album.",
            risk: RiskLevel::ReadOnly,
            script: scripts::current_track(ctx.application()),
            ctx,
        }
    }

    pub fn all_songs(ctx: MusicContext, limit: u32) -> Self {
        Self {
            name: "itunes_all_songs",
            description: "Get a list of songs in the Music library, formatted as \
                          \"Track Name - Artist\". Limited to the first tracks of the \
                          library and may take a while for large libraries.",
            risk: RiskLevel::ReadOnly,
            script: scripts::list_tracks(ctx.application(), limit),
            ctx,
        }
    }
}

#[async_trait]
impl Tool for ScriptedTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        no_arguments_schema()
    }

    async fn execute(&self, _args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        debug!(tool = self.name, "Running fixed script");
        self.ctx.run(self.name, &self.script).await
    }

    fn risk_level(&self) -> RiskLevel {
        self.risk
    }

    fn timeout(&self) -> Duration {
        self.ctx.timeout
    }
}

// ── Search ──────────────────────────────────────────────────────────────────

pub struct SearchTool {
    ctx: MusicContext,
}

impl SearchTool {
    pub fn new(ctx: MusicContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "itunes_search"
    }

    fn description(&self) -> &str {
        "Search the Music library for tracks whose names contain the given query. \
         Returns a list of tracks formatted as \"Track Name - Artist\"."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Text to look for in track names"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let query = sanitize_query(require_str(&args, "query", self.name())?);
        debug!(query = %query, "Searching library");
        let script = scripts::search_tracks(self.ctx.application(), &query);
        self.ctx.run(self.name(), &script).await
    }

    fn risk_level(&self) -> RiskLevel {
        RiskLevel::ReadOnly
    }

    fn timeout(&self) -> Duration {
        self.ctx.timeout
    }
}

// ── Play song ───────────────────────────────────────────────────────────────

pub struct PlaySongTool {
    ctx: MusicContext,
}

impl PlaySongTool {
    pub fn new(ctx: MusicContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for PlaySongTool {
    fn name(&self) -> &str {
        "itunes_play_song"
    }

    fn description(&self) -> &str {
        "Play the first track whose name exactly matches the given song name. \
         Returns a confirmation message."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "song": {
                    "type": "string",
                    "description": "Exact track name to play"
                }
            },
            "required": ["song"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let song = sanitize_query(require_str(&args, "song", self.name())?);
        debug!(song = %song, "Playing song");
        let script = scripts::play_track(self.ctx.application(), &song);
        self.ctx.run(self.name(), &script).await
    }

    fn risk_level(&self) -> RiskLevel {
        RiskLevel::Write
    }

    fn timeout(&self) -> Duration {
        self.ctx.timeout
    }
}

// ── Create playlist ─────────────────────────────────────────────────────────

pub struct CreatePlaylistTool {
    ctx: MusicContext,
}

impl CreatePlaylistTool {
    pub fn new(ctx: MusicContext) -> Self {
        Self { ctx }
    }
}

/// Split a comma-separated song list, dropping blank entries.
fn parse_song_list(songs: &str) -> Vec<String> {
    songs
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(sanitize_query)
        .collect()
}

#[async_trait]
impl Tool for CreatePlaylistTool {
    fn name(&self) -> &str {
        "itunes_create_playlist"
    }

    fn description(&self) -> &str {
        "Create a new playlist with the given name and add tracks to it. \
         'songs' is a comma-separated list of exact track names. \
         Returns a confirmation including the number of tracks added."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the new playlist"
                },
                "songs": {
                    "type": "string",
                    "description": "Comma-separated list of exact track names"
                }
            },
            "required": ["name", "songs"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let name = require_str(&args, "name", self.name())?;
        let songs = parse_song_list(require_str(&args, "songs", self.name())?);
        if songs.is_empty() {
            return Ok(ToolOutput::text("No songs provided."));
        }

        let name = sanitize_query(name);
        debug!(playlist = %name, songs = songs.len(), "Creating playlist");
        let script = scripts::create_playlist(self.ctx.application(), &name, &songs);
        self.ctx.run(self.name(), &script).await
    }

    fn risk_level(&self) -> RiskLevel {
        RiskLevel::Write
    }

    fn timeout(&self) -> Duration {
        self.ctx.timeout
    }
}

/// Every Music tool, in registration order.
pub fn music_tools(ctx: &MusicContext, config: &MusicConfig) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ScriptedTool::transport(
            ctx.clone(),
            "itunes_play",
            "Start playback in Music (iTunes).",
            Transport::Play,
        )),
        Arc::new(ScriptedTool::transport(
            ctx.clone(),
            "itunes_pause",
            "Pause playback in Music (iTunes).",
            Transport::Pause,
        )),
        Arc::new(ScriptedTool::transport(
            ctx.clone(),
            "itunes_next",
            "Skip to the next track.",
            Transport::NextTrack,
        )),
        Arc::new(ScriptedTool::transport(
            ctx.clone(),
            "itunes_previous",
            "Return to the previous track.",
            Transport::PreviousTrack,
        )),
        Arc::new(SearchTool::new(ctx.clone())),
        Arc::new(PlaySongTool::new(ctx.clone())),
        Arc::new(CreatePlaylistTool::new(ctx.clone())),
        Arc::new(ScriptedTool::library(ctx.clone())),
        Arc::new(ScriptedTool::current_song(ctx.clone())),
        Arc::new(ScriptedTool::all_songs(
            ctx.clone(),
            config.library_listing_limit,
        )),
    ]
}
