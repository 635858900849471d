//! Configuration file editor command.

use crate::config::get_config_path;
use std::process::Command;

/// Opens the voxclip configuration file in the user's preferred editor.
///
/// Tries `$EDITOR`, then nano, then vi.
///
/// # Errors
/// - If no editor can be found or executed
/// - If the editor exits with an error
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor(std::env::var("EDITOR").ok(), is_editor_available)?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Picks `$EDITOR` when set, otherwise the first available fallback.
fn find_editor(
    env_editor: Option<String>,
    is_available: impl Fn(&str) -> bool,
) -> anyhow::Result<String> {
    if let Some(editor) = env_editor.filter(|e| !e.trim().is_empty()) {
        return Ok(editor);
    }

    ["nano", "vi"]
        .into_iter()
        .find(|editor| is_available(*editor))
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No editor found. Please set the $EDITOR environment variable."))
}

/// Checks if an editor is available in the system PATH.
fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_env_wins() {
        let editor = find_editor(Some("hx".to_string()), |_| true).unwrap();
        assert_eq!(editor, "hx");
    }

    #[test]
    fn test_editor_fallback_order() {
        assert_eq!(find_editor(Some(" ".to_string()), |_| true).unwrap(), "nano");
        assert_eq!(find_editor(None, |e| e == "vi").unwrap(), "vi");
        assert!(find_editor(None, |_| false).is_err());
    }
}
