//! Configuration file management for voxclip.
//!
//! This module handles loading application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use anyhow::anyhow;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Audio device and status tick configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Input device for recording. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `voxclip list-devices`
    /// - device name from `voxclip list-devices`
    #[serde(default = "default_device")]
    pub input_device: String,
    /// Output device for playback, same format as `input_device`
    #[serde(default = "default_device")]
    pub output_device: String,
    /// Requested recording sample rate in Hz (the device rate wins if it differs)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Interval between status ticks in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_tick_interval_ms() -> u64 {
    50
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_device: default_device(),
            output_device: default_device(),
            sample_rate: default_sample_rate(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Where captures and saved recordings live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory saved recordings are copied to
    #[serde(default)]
    pub save_dir: Option<PathBuf>,
    /// Directory in-progress captures are written to
    #[serde(default)]
    pub capture_dir: Option<PathBuf>,
    /// File extension of saved recordings
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "wav".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: None,
            capture_dir: None,
            extension: default_extension(),
        }
    }
}

impl StorageConfig {
    /// Resolved save directory, `~/.local/share/voxclip/recordings` unless configured.
    pub fn save_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.save_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("recordings")),
        }
    }

    /// Resolved capture directory, `<tmp>/voxclip` unless configured.
    pub fn capture_dir(&self) -> PathBuf {
        self.capture_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("voxclip"))
    }
}

/// Sound test screen configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoundTestConfig {
    /// Sound to load. The bundled sound is used when unset
    #[serde(default)]
    pub asset: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoxclipConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sound_test: SoundTestConfig,
}

impl VoxclipConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Failed to read {}: {e}", config_path.display()))?;
        Self::parse(&config_content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: VoxclipConfig = toml::from_str(content)?;
        if config.audio.tick_interval_ms == 0 {
            return Err(anyhow!("audio.tick_interval_ms must be greater than zero"));
        }
        if config.storage.extension.trim().is_empty() {
            return Err(anyhow!("storage.extension must not be empty"));
        }
        Ok(config)
    }
}

/// Retrieves the path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("voxclip");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("voxclip.toml"))
}

/// Application data directory, `~/.local/share/voxclip`.
pub fn data_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("voxclip"))
}
