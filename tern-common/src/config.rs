//! Configuration loading for the player service
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default HTTP port for the player service
pub const DEFAULT_PORT: u16 = 6810;

/// Default number of entries considered by play-recent
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Default EventBus / command channel capacity
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Player service configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub host: String,
    pub port: u16,
    /// How many of the most recent playable entries play-recent queues
    pub recent_limit: usize,
    /// Broadcast channel capacity for events and surface commands
    pub event_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            recent_limit: DEFAULT_RECENT_LIMIT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// TOML file shape; every field optional so partial files work
#[derive(Debug, Default, Deserialize)]
struct PlayerConfigFile {
    host: Option<String>,
    port: Option<u16>,
    recent_limit: Option<usize>,
    event_capacity: Option<usize>,
}

impl PlayerConfig {
    /// Resolve configuration from an optional CLI-provided file path
    ///
    /// Port precedence: `cli_port` > `TERN_MP_PORT` > config file > default.
    /// Other settings come from the config file or defaults.
    pub fn resolve(cli_config: Option<&Path>, cli_port: Option<u16>) -> Result<Self> {
        let file = match cli_config {
            Some(path) => Some(load_config_file(path)?),
            None => match default_config_path() {
                Some(path) if path.exists() => Some(load_config_file(&path)?),
                _ => None,
            },
        };
        let file = file.unwrap_or_default();

        let mut config = PlayerConfig::default();
        if let Some(host) = file.host {
            config.host = host;
        }
        if let Some(port) = file.port {
            config.port = port;
        }
        if let Some(limit) = file.recent_limit {
            config.recent_limit = limit.max(1);
        }
        if let Some(capacity) = file.event_capacity {
            config.event_capacity = capacity.max(16);
        }

        if let Ok(port) = std::env::var("TERN_MP_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid TERN_MP_PORT: {}", port)))?;
        }
        if let Some(port) = cli_port {
            config.port = port;
        }

        Ok(config)
    }
}

/// Parse a TOML config file
fn load_config_file(path: &Path) -> Result<PlayerConfigFile> {
    debug!("Loading config from {}", path.display());
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Cannot parse {}: {}", path.display(), e)))
}

/// Platform default config file location
///
/// Linux: `~/.config/tern/player.toml`, falling back to
/// `/etc/tern/player.toml`. macOS and Windows use the platform config dir.
pub fn default_config_path() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        let user_config = dirs::config_dir().map(|d| d.join("tern").join("player.toml"));
        if let Some(ref path) = user_config {
            if path.exists() {
                return user_config;
            }
        }
        let system_config = PathBuf::from("/etc/tern/player.toml");
        if system_config.exists() {
            return Some(system_config);
        }
        user_config
    } else {
        dirs::config_dir().map(|d| d.join("tern").join("player.toml"))
    }
}
