//! First-run setup and config migration.
//!
//! Writes the default sgram.toml when none exists and keeps its version line
//! in step with the running release.

pub mod version;

use anyhow::anyhow;
use std::path::Path;

use crate::config::get_config_path;
use version::{check_setup_needed, update_config_version, SetupAction, CURRENT_VERSION};

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/sgram.toml");

/// Default config file contents, starting with the version line.
fn default_config() -> String {
    format!("config_version = \"{CURRENT_VERSION}\"\n{DEFAULT_CONFIG}")
}

/// Creates or migrates the config file before any command needs it.
///
/// Migration keeps the user's values; keys added since then take their
/// defaults when the file is loaded.
///
/// # Errors
/// - If the config path cannot be determined
/// - If the file cannot be read or written
pub fn ensure_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;

    match check_setup_needed(&config_path)? {
        SetupAction::Create => {
            tracing::info!("No config found, writing defaults to {}", config_path.display());
            write_default_config(&config_path)?;
        }
        SetupAction::Migrate { from } => {
            tracing::info!("Migrating config from version {} to {}", from, CURRENT_VERSION);
            update_config_version(&config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow!("Failed to update config version: {e}")
            })?;
        }
        SetupAction::UpToDate => {
            tracing::debug!("Config version up to date ({})", CURRENT_VERSION);
        }
    }

    Ok(())
}

fn write_default_config(config_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, default_config())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SgramConfig;

    #[test]
    fn test_default_config_is_versioned_and_loads() {
        let content = default_config();
        assert!(content.starts_with("config_version = \""));

        let config = SgramConfig::from_toml(&content).unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.analysis.fft_size, 2048);
    }
}
