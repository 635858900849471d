//! Config version tracking.
//!
//! The first line of the config file records the version that wrote it. Comparing
//! it with the running binary decides whether setup has to run.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Represents a semantic version (major.minor.patch)
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    /// Parse a version string like "0.1.0" into a SemanticVersion
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let parts: Vec<u32> = version_str
            .trim()
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| anyhow!("Invalid version component '{part}' in '{version_str}'"))
            })
            .collect::<anyhow::Result<_>>()?;

        match parts.as_slice() {
            [major, minor, patch] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: *patch,
            }),
            _ => Err(anyhow!(
                "Invalid version format: '{version_str}'. Expected 'major.minor.patch'"
            )),
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Why setup has to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupNeeded {
    /// No config file yet
    Missing,
    /// Config written by an older version (or with no version line)
    Outdated { from: String },
}

/// Reads `config_version = "X.Y.Z"` from the first line of the config file.
///
/// Returns `None` when the first line is not a version line.
fn read_config_version(content: &str) -> anyhow::Result<Option<String>> {
    let Some(first_line) = content.lines().next() else {
        return Ok(None);
    };

    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    Ok(regex
        .captures(first_line)
        .map(|caps| caps[1].to_string()))
}

/// Determines whether setup is needed for the config at `config_path`.
///
/// # Errors
/// Returns an error if the file exists but cannot be read, or its version is malformed.
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<Option<SetupNeeded>> {
    if !config_path.exists() {
        return Ok(Some(SetupNeeded::Missing));
    }

    let content = std::fs::read_to_string(config_path)?;
    let Some(config_version) = read_config_version(&content)? else {
        return Ok(Some(SetupNeeded::Outdated {
            from: "unknown (unversioned config)".to_string(),
        }));
    };

    let config_parsed = SemanticVersion::parse(&config_version)?;
    let current_parsed = SemanticVersion::parse(CURRENT_VERSION)?;

    match config_parsed.cmp(&current_parsed) {
        Ordering::Less => Ok(Some(SetupNeeded::Outdated {
            from: config_parsed.to_string(),
        })),
        Ordering::Equal => Ok(None),
        Ordering::Greater => {
            tracing::warn!(
                "Config version {} is newer than app version {}",
                config_parsed,
                CURRENT_VERSION
            );
            Ok(None)
        }
    }
}

/// Rewrites the version line at the top of the config, keeping everything else.
pub fn update_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;

    let lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().starts_with("config_version"))
        .collect();

    let version_line = format!(r#"config_version = "{}""#, CURRENT_VERSION);
    let new_content = if lines.is_empty() {
        version_line
    } else {
        format!("{}\n{}", version_line, lines.join("\n"))
    };

    std::fs::write(config_path, new_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_version_parse() {
        let v = SemanticVersion::parse("0.1.7").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (0, 1, 7));
        assert_eq!(v.to_string(), "0.1.7");
    }

    #[test]
    fn test_semantic_version_comparison() {
        let v1 = SemanticVersion::parse("0.0.9").unwrap();
        let v2 = SemanticVersion::parse("0.1.0").unwrap();
        let v3 = SemanticVersion::parse("1.0.0").unwrap();

        assert!(v1 < v2);
        assert!(v2 < v3);
    }

    #[test]
    fn test_invalid_version_format() {
        assert!(SemanticVersion::parse("0.1").is_err());
        assert!(SemanticVersion::parse("0.1.0.1").is_err());
        assert!(SemanticVersion::parse("latest").is_err());
    }

    #[test]
    fn test_version_line_must_be_first() {
        assert_eq!(
            read_config_version("config_version = \"0.1.0\"\n[audio]\n").unwrap(),
            Some("0.1.0".to_string())
        );
        assert_eq!(
            read_config_version("# config_version = \"0.1.0\"\n").unwrap(),
            None
        );
        assert_eq!(read_config_version("").unwrap(), None);
    }

    #[test]
    fn test_missing_config_needs_setup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxclip.toml");
        assert_eq!(check_setup_needed(&path).unwrap(), Some(SetupNeeded::Missing));
    }

    #[test]
    fn test_current_config_needs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxclip.toml");
        std::fs::write(&path, format!("config_version = \"{CURRENT_VERSION}\"\n")).unwrap();
        assert_eq!(check_setup_needed(&path).unwrap(), None);
    }

    #[test]
    fn test_outdated_config_keeps_settings_on_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxclip.toml");
        std::fs::write(
            &path,
            "config_version = \"0.0.1\"\n[audio]\ninput_device = \"USB Mic\"\n",
        )
        .unwrap();

        assert_eq!(
            check_setup_needed(&path).unwrap(),
            Some(SetupNeeded::Outdated {
                from: "0.0.1".to_string()
            })
        );

        update_config_version(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!("config_version = \"{CURRENT_VERSION}\"\n[audio]\ninput_device = \"USB Mic\"")
        );
        assert_eq!(check_setup_needed(&path).unwrap(), None);
    }
}
