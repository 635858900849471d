//! Display recent log entries from the application.

use crate::logging::{get_log_dir, LOG_FILE_PREFIX};
use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_LINES: usize = 50;

/// Prints the last lines of the most recent log file.
///
/// # Errors
/// - If the log directory cannot be determined or read
/// - If the log file cannot be read
pub fn handle_logs() -> anyhow::Result<()> {
    let log_dir = get_log_dir()?;

    if !log_dir.exists() {
        println!("Log directory does not exist yet: {}", log_dir.display());
        println!("Logs will be created when the application runs.");
        return Ok(());
    }

    let Some(log_file) = find_latest_log(&log_dir)? else {
        println!("No log files found in: {}", log_dir.display());
        println!("Run 'voxclip' to generate logs.");
        return Ok(());
    };

    let content =
        fs::read_to_string(&log_file).map_err(|e| anyhow!("Failed to read log file: {e}"))?;
    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let lines = tail(&content, DEFAULT_LINES);
    let total = content.lines().count();

    println!();
    if lines.len() < total {
        println!("Showing last {} of {} lines:", lines.len(), total);
    } else {
        println!("Showing all {total} lines:");
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in lines {
        println!("{line}");
    }

    Ok(())
}

/// Last `count` lines of `content`.
fn tail(content: &str, count: usize) -> Vec<&str> {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].to_vec()
}

/// Most recently modified log file in `log_dir`, if any.
fn find_latest_log(log_dir: &Path) -> anyhow::Result<Option<PathBuf>> {
    let entries =
        fs::read_dir(log_dir).map_err(|e| anyhow!("Failed to read log directory: {e}"))?;

    let mut latest: Option<(PathBuf, std::time::SystemTime)> = None;
    for entry in entries {
        let path = entry
            .map_err(|e| anyhow!("Failed to read directory entry: {e}"))?
            .path();

        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let Ok(modified) = fs::metadata(&path).and_then(|meta| meta.modified()) else {
            continue;
        };
        if latest.as_ref().map_or(true, |(_, newest)| modified > *newest) {
            latest = Some((path, modified));
        }
    }

    Ok(latest.map(|(path, _)| path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_returns_last_lines() {
        let content = "a\nb\nc\nd\n";
        assert_eq!(tail(content, 2), vec!["c", "d"]);
        assert_eq!(tail(content, 10), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_find_latest_log_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_latest_log(dir.path()).unwrap(), None);

        fs::write(dir.path().join("voxclip.toml"), "").unwrap();
        fs::write(dir.path().join("voxclip.log.2026-04-02"), "x").unwrap();

        let latest = find_latest_log(dir.path()).unwrap().unwrap();
        assert_eq!(latest.file_name().unwrap(), "voxclip.log.2026-04-02");
    }
}
