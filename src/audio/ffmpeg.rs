//! FFmpeg locator and decoder.
//!
//! WAV files are read directly with hound. Any other format (mp3, m4a, ogg, ...)
//! is first decoded by ffmpeg into a temporary 16-bit mono WAV.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Locates the ffmpeg binary on the system.
///
/// Checks the usual install locations for the platform, then falls back to a PATH search.
pub fn find_ffmpeg() -> Result<PathBuf> {
    let candidates = if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/opt/homebrew/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/usr/bin/ffmpeg"),
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            PathBuf::from("/usr/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/snap/bin/ffmpeg"),
        ]
    } else if cfg!(target_os = "windows") {
        vec![
            PathBuf::from("C:\\ffmpeg\\bin\\ffmpeg.exe"),
            PathBuf::from("C:\\Program Files\\ffmpeg\\bin\\ffmpeg.exe"),
        ]
    } else {
        vec![]
    };

    if let Some(path) = candidates.into_iter().find(|path| path.exists()) {
        tracing::debug!("Found ffmpeg at: {}", path.display());
        return Ok(path);
    }

    let ffmpeg_path = find_in_path("ffmpeg")?;
    tracing::debug!("Found ffmpeg in PATH at: {}", ffmpeg_path.display());
    Ok(ffmpeg_path)
}

/// Searches for a binary in the system PATH using `which` or `where`.
fn find_in_path(binary_name: &str) -> Result<PathBuf> {
    let search_cmd = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };

    let output = Command::new(search_cmd)
        .arg(binary_name)
        .output()
        .map_err(|e| anyhow!("Failed to search PATH for {binary_name}: {e}"))?;

    if output.status.success() {
        let path_str = String::from_utf8_lossy(&output.stdout);
        let path = PathBuf::from(path_str.lines().next().unwrap_or_default().trim());
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }

    Err(anyhow!(
        "ffmpeg not found. Only WAV files can be played without it.\n\
         macOS: brew install ffmpeg\n\
         Linux: apt install ffmpeg (Debian/Ubuntu) or dnf install ffmpeg (Fedora)"
    ))
}

/// Decodes any ffmpeg-readable file into a 16-bit mono WAV at `output_wav`.
///
/// # Errors
/// - If ffmpeg cannot be found
/// - If ffmpeg exits unsuccessfully
pub fn decode_to_wav(input: &Path, output_wav: &Path) -> Result<()> {
    let ffmpeg_path = find_ffmpeg()?;

    let output = Command::new(&ffmpeg_path)
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(input)
        .arg("-acodec")
        .arg("pcm_s16le")
        .arg("-ac")
        .arg("1")
        .arg("-y")
        .arg(output_wav)
        .output()?;

    if output.status.success() {
        tracing::debug!(
            "Decoded {} to {}",
            input.display(),
            output_wav.display()
        );
        Ok(())
    } else {
        let error_msg = String::from_utf8_lossy(&output.stderr);
        tracing::error!("ffmpeg decoding failed: {}", error_msg);
        Err(anyhow!("Audio decoding failed: {error_msg}"))
    }
}
