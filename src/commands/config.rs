//! Configuration file editor command.
//!
//! Opens sgram.toml in the user's preferred editor.

use std::process::Command;

use crate::config::get_config_path;

/// Opens the configuration file in `$EDITOR`, falling back to nano and then vi.
///
/// # Errors
/// - If no editor can be found or executed
/// - If the editor exits with a failure status
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

fn find_editor(from_env: Option<String>, available: impl Fn(&str) -> bool) -> anyhow::Result<String> {
    if let Some(editor) = from_env.filter(|e| !e.is_empty()) {
        return Ok(editor);
    }

    ["nano", "vi"]
        .into_iter()
        .find(|editor| available(editor))
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
    fn test_editor_preference() {
        assert_eq!(find_editor(Some("hx".into()), |_| true).unwrap(), "hx");
        assert_eq!(find_editor(Some(String::new()), |_| true).unwrap(), "nano");
        assert_eq!(find_editor(None, |e| e == "vi").unwrap(), "vi");
        assert!(find_editor(None, |_| false).is_err());
    }
}
