//! Configuration
//!
//! Spendsight reads an optional TOML file:
//!
//! ```toml
//! data_dir = "/home/me/.local/share/spendsight"
//! rules_file = "exclusion_rules.json"
//! expenses_file = "recurring_expenses.json"
//! notes_file = "period_notes.json"
//! ```
//!
//! Every key is optional. Relative file names resolve against `data_dir`.
//! The `SPENDSIGHT_DATA_DIR` environment variable overrides `data_dir`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "SPENDSIGHT_DATA_DIR";

const DEFAULT_RULES_FILE: &str = "exclusion_rules.json";
const DEFAULT_EXPENSES_FILE: &str = "recurring_expenses.json";
const DEFAULT_NOTES_FILE: &str = "period_notes.json";

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    rules_file: PathBuf,
    expenses_file: PathBuf,
    notes_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rules_file: PathBuf::from(DEFAULT_RULES_FILE),
            expenses_file: PathBuf::from(DEFAULT_EXPENSES_FILE),
            notes_file: PathBuf::from(DEFAULT_NOTES_FILE),
        }
    }
}

/// Platform data directory for Spendsight, `./data` if there is none
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("spendsight"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendsight").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    data_dir: Option<PathBuf>,
    rules_file: Option<PathBuf>,
    expenses_file: Option<PathBuf>,
    notes_file: Option<PathBuf>,
}

impl Config {
    /// Load from `override_path`, else the default location, then apply the
    /// environment override. A missing file means defaults.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = override_path
            .map(Path::to_path_buf)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::parse(&content)?
            }
            Some(path) if override_path.is_some() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            _ => Self::default(),
        };

        config.apply_data_dir_override(std::env::var(DATA_DIR_ENV).ok());
        Ok(config)
    }

    /// Parse config from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();
        if let Some(dir) = raw.data_dir {
            config.data_dir = dir;
        }
        if let Some(file) = raw.rules_file {
            config.rules_file = file;
        }
        if let Some(file) = raw.expenses_file {
            config.expenses_file = file;
        }
        if let Some(file) = raw.notes_file {
            config.notes_file = file;
        }
        Ok(config)
    }

    /// Config rooted at `data_dir` with default file names
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    fn apply_data_dir_override(&mut self, value: Option<String>) {
        if let Some(dir) = value.filter(|v| !v.trim().is_empty()) {
            debug!("Data directory overridden by {}", DATA_DIR_ENV);
            self.data_dir = PathBuf::from(dir);
        }
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }

    pub fn rules_path(&self) -> PathBuf {
        self.resolve(&self.rules_file)
    }

    pub fn expenses_path(&self) -> PathBuf {
        self.resolve(&self.expenses_file)
    }

    pub fn notes_path(&self) -> PathBuf {
        self.resolve(&self.notes_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.rules_path().ends_with(DEFAULT_RULES_FILE));
    }

    #[test]
    fn test_relative_files_resolve_against_data_dir() {
        let config = Config::parse(
            r#"
            data_dir = "/srv/spendsight"
            rules_file = "my_rules.json"
            notes_file = "/elsewhere/notes.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.rules_path(), PathBuf::from("/srv/spendsight/my_rules.json"));
        assert_eq!(
            config.expenses_path(),
            PathBuf::from("/srv/spendsight").join(DEFAULT_EXPENSES_FILE)
        );
        assert_eq!(config.notes_path(), PathBuf::from("/elsewhere/notes.json"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(Config::parse("data_dir = ["), Err(Error::Config(_))));
        assert!(matches!(Config::parse("unknown_key = 1"), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::with_data_dir("/a");
        config.apply_data_dir_override(Some("/b".to_string()));
        assert_eq!(config.data_dir, PathBuf::from("/b"));

        config.apply_data_dir_override(Some("  ".to_string()));
        assert_eq!(config.data_dir, PathBuf::from("/b"));

        config.apply_data_dir_override(None);
        assert_eq!(config.data_dir, PathBuf::from("/b"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "rules_file = \"r.json\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.rules_path().ends_with("r.json"));
    }

    #[test]
    fn test_load_missing_override_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(Config::load(Some(&missing)), Err(Error::Config(_))));
    }
}
