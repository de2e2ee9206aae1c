//! Client configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Where the game id goes in the connection URL.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IdPlacement {
    /// Appended as a path segment: `{base}/{game_id}?name=...`.
    #[default]
    Path,
    /// Sent as a query parameter: `{base}?gameid={game_id}&name=...`.
    Query,
}

/// Settings for the terminal client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct ClientConfig {
    /// WebSocket endpoint of the game server.
    #[serde(default = "default_server_url")]
    server_url: String,

    /// How the game id is encoded in the connection URL.
    #[serde(default)]
    game_id_placement: IdPlacement,

    /// Name to join with when none is given on the command line.
    #[serde(default)]
    #[setters(strip_option)]
    player_name: Option<String>,

    /// Grace period for closing the connection before the task is aborted.
    #[serde(default = "default_shutdown_timeout_ms")]
    shutdown_timeout_ms: u64,

    /// File receiving log output while the terminal UI owns the screen.
    #[serde(default = "default_log_file")]
    log_file: PathBuf,
}

fn default_server_url() -> String {
    "ws://localhost:8292/ws".to_string()
}

/// Grace period for closing the socket when the user leaves.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 1000;

fn default_shutdown_timeout_ms() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_MS
}

fn default_log_file() -> PathBuf {
    PathBuf::from("gravity_four.log")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            game_id_placement: IdPlacement::default(),
            player_name: None,
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            log_file: default_log_file(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(server_url = %config.server_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Shutdown grace period.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Parses the server URL into an [`Endpoint`].
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        Endpoint::parse(&self.server_url, self.game_id_placement)
    }
}

/// A validated server base URL plus the rule for embedding the game id.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Endpoint {
    base: Url,
    placement: IdPlacement,
}

impl Endpoint {
    /// Validates a `ws://` or `wss://` base URL.
    #[instrument]
    pub fn parse(base: &str, placement: IdPlacement) -> Result<Self, ConfigError> {
        let base = Url::parse(base)
            .map_err(|e| ConfigError::new(format!("Invalid server URL {base:?}: {e}")))?;
        if !matches!(base.scheme(), "ws" | "wss") || base.cannot_be_a_base() {
            return Err(ConfigError::new(format!(
                "Server URL must use ws:// or wss://, got {base}"
            )));
        }
        Ok(Self { base, placement })
    }

    /// Connection URL for a game and player.
    #[instrument(skip(self), fields(base = %self.base))]
    pub fn target(&self, game_id: &str, player_name: &str) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        match self.placement {
            IdPlacement::Path => {
                // Endpoint::parse rejects cannot-be-a-base URLs, so this succeeds.
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push(game_id);
                }
                url.query_pairs_mut().append_pair("name", player_name);
            }
            IdPlacement::Query => {
                url.query_pairs_mut()
                    .append_pair("gameid", game_id)
                    .append_pair("name", player_name);
            }
        }
        debug!(target = %url, "Built connection target");
        url
    }
}

/// Validates a player name: trimmed, non-empty.
#[instrument]
pub fn validate_player_name(raw: &str) -> Result<String, PlayerNameError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(PlayerNameError::Blank);
    }
    Ok(name.to_string())
}

/// A player name the user typed was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PlayerNameError {
    /// Empty or whitespace only.
    #[display("Please enter a valid username.")]
    Blank,
}

impl std::error::Error for PlayerNameError {}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
