//! Configuration for the ram-audio player
//!
//! Bootstrap settings come from an optional TOML file. Every field has a
//! built-in default, so a missing or partial file never prevents startup.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (see `main.rs`)
//! 2. TOML file given with `--config`
//! 3. `<config_dir>/ram-audio/config.toml`
//! 4. Built-in defaults
//!
//! ```toml
//! [output]
//! device = "USB Audio"
//! buffer_size = 512
//! render_rate = 48000
//!
//! [playback]
//! command_queue_capacity = 64
//!
//! [logging]
//! level = "debug"
//! ```

use crate::error::{Error, Result};
use crate::playback::control::DEFAULT_COMMAND_QUEUE_CAPACITY;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Top-level player configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub output: OutputConfig,
    pub playback: PlaybackConfig,
    pub logging: LoggingConfig,
}

/// Audio output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output device name (None = host default device)
    pub device: Option<String>,

    /// Device buffer size in frames (None = device default)
    pub buffer_size: Option<u32>,

    /// Mix rate used when rendering to a WAV file instead of a device
    ///
    /// Default: 44100
    pub render_rate: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            device: None,
            buffer_size: None,
            render_rate: default_render_rate(),
        }
    }
}

/// Playback configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Control commands that may queue up between two mix callbacks
    pub command_queue_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            command_queue_capacity: DEFAULT_COMMAND_QUEUE_CAPACITY,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_render_rate() -> u32 {
    44100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PlayerConfig {
    /// Load configuration.
    ///
    /// With an explicit `path` the file must exist and parse. Without one,
    /// the per-user config file is used if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => {
                    info!("No configuration file found, using built-in defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Read and parse a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config = Self::from_toml_str(&toml_str)?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Parse configuration from TOML text and validate it.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: PlayerConfig = toml::from_str(toml_str)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.output.render_rate == 0 {
            return Err(Error::Config("output.render_rate must be positive".to_string()));
        }
        if self.playback.command_queue_capacity == 0 {
            return Err(Error::Config(
                "playback.command_queue_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<config_dir>/ram-audio/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ram-audio").join("config.toml"))
}
