//! Config file versioning.
//!
//! The first line of sgram.toml records the version that wrote it. Comparing
//! it with the running version decides whether the file needs to be created or
//! migrated.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// Current application version from Cargo.toml
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A `major.minor.patch` version.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let regex = Regex::new(r"^(\d+)\.(\d+)\.(\d+)$")?;
        let caps = regex.captures(version_str.trim()).ok_or_else(|| {
            anyhow!("Invalid version format: '{version_str}'. Expected 'major.minor.patch'")
        })?;

        let part = |i: usize| {
            caps[i]
                .parse::<u32>()
                .map_err(|_| anyhow!("Version component out of range: '{}'", &caps[i]))
        };

        Ok(Self {
            major: part(1)?,
            minor: part(2)?,
            patch: part(3)?,
        })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// What the startup check decided about the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupAction {
    /// No config file exists yet
    Create,
    /// The file was written by an older (or unversioned) release
    Migrate { from: String },
    /// Nothing to do
    UpToDate,
}

/// Extracts the version from a `config_version = "X.Y.Z"` first line.
///
/// Comments and any later lines are ignored.
fn read_config_version(content: &str) -> anyhow::Result<Option<String>> {
    let Some(first_line) = content.lines().next() else {
        return Ok(None);
    };
    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    Ok(regex.captures(first_line).map(|caps| caps[1].to_string()))
}

/// Decides whether the config file at `config_path` must be created or migrated.
///
/// # Errors
/// - If the file exists but cannot be read
/// - If the recorded version is malformed
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<SetupAction> {
    if !config_path.exists() {
        return Ok(SetupAction::Create);
    }
    let content = std::fs::read_to_string(config_path)?;
    compare_with_current(&content, CURRENT_VERSION)
}

fn compare_with_current(content: &str, current: &str) -> anyhow::Result<SetupAction> {
    let Some(config_version) = read_config_version(content)? else {
        return Ok(SetupAction::Migrate {
            from: "unknown (unversioned config)".to_string(),
        });
    };

    let recorded = SemanticVersion::parse(&config_version)?;
    let running = SemanticVersion::parse(current)?;
    match recorded.cmp(&running) {
        Ordering::Less => Ok(SetupAction::Migrate {
            from: recorded.to_string(),
        }),
        Ordering::Equal => Ok(SetupAction::UpToDate),
        Ordering::Greater => {
            tracing::warn!(
                "Config version {} is newer than app version {}",
                recorded,
                running
            );
            Ok(SetupAction::UpToDate)
        }
    }
}

/// Replaces any `config_version` line with one for the running version, placed first.
fn with_version_line(content: &str) -> String {
    let version_line = format!(r#"config_version = "{CURRENT_VERSION}""#);
    let rest: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("config_version"))
        .collect();
    if rest.is_empty() {
        version_line
    } else {
        format!("{}\n{}", version_line, rest.join("\n"))
    }
}

/// Rewrites the version line of the config file, keeping every other line.
///
/// # Errors
/// - If the file cannot be read or written
pub fn update_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;
    std::fs::write(config_path, with_version_line(&content))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_version_parse() {
        let v = SemanticVersion::parse("0.1.12").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (0, 1, 12));
        assert_eq!(v.to_string(), "0.1.12");
    }

    #[test]
    fn test_invalid_version_format() {
        assert!(SemanticVersion::parse("0.1").is_err());
        assert!(SemanticVersion::parse("0.1.2.3").is_err());
        assert!(SemanticVersion::parse("v0.1.2").is_err());
        assert!(SemanticVersion::parse("").is_err());
    }

    #[test]
    fn test_versions_compare_numerically() {
        let older = SemanticVersion::parse("0.9.0").unwrap();
        let newer = SemanticVersion::parse("0.10.0").unwrap();
        assert!(older < newer);
    }

    #[test]
    fn test_read_config_version_first_line_only() {
        let content = "config_version = \"0.1.0\"\n[audio]\n";
        assert_eq!(read_config_version(content).unwrap(), Some("0.1.0".into()));

        let commented = "# config_version = \"0.1.0\"\n";
        assert_eq!(read_config_version(commented).unwrap(), None);

        let later = "\n[audio]\nconfig_version = \"0.1.0\"\n";
        assert_eq!(read_config_version(later).unwrap(), None);
        assert_eq!(read_config_version("").unwrap(), None);
    }

    #[test]
    fn test_setup_action() {
        assert_eq!(
            compare_with_current("config_version = \"0.1.0\"", "0.1.0").unwrap(),
            SetupAction::UpToDate
        );
        assert_eq!(
            compare_with_current("config_version = \"0.0.9\"", "0.1.0").unwrap(),
            SetupAction::Migrate {
                from: "0.0.9".into()
            }
        );
        assert_eq!(
            compare_with_current("config_version = \"0.2.0\"", "0.1.0").unwrap(),
            SetupAction::UpToDate
        );
        assert!(matches!(
            compare_with_current("[audio]\n", "0.1.0").unwrap(),
            SetupAction::Migrate { .. }
        ));
    }

    #[test]
    fn test_version_line_is_replaced() {
        let content = "config_version = \"0.0.1\"\n[audio]\ndevice = \"default\"";
        let updated = with_version_line(content);
        let mut lines = updated.lines();
        assert_eq!(
            lines.next(),
            Some(format!(r#"config_version = "{CURRENT_VERSION}""#).as_str())
        );
        assert_eq!(lines.next(), Some("[audio]"));
        assert_eq!(updated.matches("config_version").count(), 1);
    }
}
