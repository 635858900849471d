//! First-run setup: writes the default configuration and extracts the bundled
//! sound used by the sound test screen.

pub mod version;

use crate::config::data_dir;
use std::path::{Path, PathBuf};

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/voxclip.toml");

/// Embedded sound loaded by the sound test screen.
const BUNDLED_SOUND: &[u8] = include_bytes!("../../assets/sounds/001.wav");

const BUNDLED_SOUND_NAME: &str = "001.wav";

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Writes the default config file, prefixed with the current config version.
///
/// # Errors
/// Returns an error if the config directory or file cannot be written.
pub fn run_setup(config_path: &Path) -> anyhow::Result<()> {
    if let Some(config_dir) = config_path.parent() {
        std::fs::create_dir_all(config_dir)?;
    }

    let full_config = format!(
        "config_version = \"{}\"\n{}",
        CURRENT_VERSION, DEFAULT_CONFIG
    );
    std::fs::write(config_path, full_config)?;
    tracing::info!("Wrote default config to {}", config_path.display());
    Ok(())
}

/// Path of the bundled sound, extracting it to the data directory on first use.
///
/// # Errors
/// Returns an error if the data directory cannot be determined or written.
pub fn bundled_sound_path() -> anyhow::Result<PathBuf> {
    extract_bundled_sound(&data_dir()?.join("sounds"))
}

fn extract_bundled_sound(sounds_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = sounds_dir.join(BUNDLED_SOUND_NAME);
    let up_to_date = std::fs::metadata(&path)
        .map(|meta| meta.len() == BUNDLED_SOUND.len() as u64)
        .unwrap_or(false);

    if !up_to_date {
        std::fs::create_dir_all(sounds_dir)?;
        std::fs::write(&path, BUNDLED_SOUND)?;
        tracing::debug!("Extracted bundled sound to {}", path.display());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::read_wav;
    use crate::config::VoxclipConfig;

    #[test]
    fn test_setup_writes_versioned_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("voxclip").join("voxclip.toml");

        run_setup(&config_path).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.starts_with(&format!("config_version = \"{CURRENT_VERSION}\"")));
        assert!(VoxclipConfig::parse(&content).is_ok());
    }

    #[test]
    fn test_bundled_sound_extracted_once() {
        let dir = tempfile::tempdir().unwrap();
        let sounds_dir = dir.path().join("sounds");

        let path = extract_bundled_sound(&sounds_dir).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), BUNDLED_SOUND);

        let clip = read_wav(&path).unwrap();
        assert!(clip.duration_ms() > 0);

        // A truncated copy is replaced
        std::fs::write(&path, b"RIFF").unwrap();
        extract_bundled_sound(&sounds_dir).unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), BUNDLED_SOUND.len());
    }
}
