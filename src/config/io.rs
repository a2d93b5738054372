//! Configuration file I/O operations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{Config, DEFAULT_CONFIG_TOML};
use crate::store::write_atomic_locked;

impl Config {
    /// Get the global config directory path (~/.simulateai/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".simulateai")
    }

    /// Get the global config file path (~/.simulateai/badges.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("badges.toml")
    }

    /// Default directory for persisted learner state
    pub fn default_state_dir() -> PathBuf {
        Self::global_config_dir().join("state")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from `path`, or the global path when `None`.
    ///
    /// Falls back to the built-in configuration if the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::global_config_path);

        if path.exists() {
            debug!(path = %path.display(), "Loading badge config");
            Self::from_file(&path)
        } else {
            debug!(path = %path.display(), "No badge config found, using built-in defaults");
            Self::builtin().context("Built-in badge config is invalid")
        }
    }

    /// Save configuration to a file with atomic write and file locking.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        write_atomic_locked(path, content.as_bytes())
    }

    /// Write the commented default configuration to `path`.
    ///
    /// Returns `false` if the file already exists and `force` is not set.
    pub fn write_default(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            return Ok(false);
        }
        write_atomic_locked(path, DEFAULT_CONFIG_TOML.as_bytes())?;
        info!(path = %path.display(), "Wrote default badge config");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_uses_builtin() {
        let dir = tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("missing.toml"))).unwrap();
        assert!(!config.categories.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/badges.toml");

        let mut config = Config::builtin().unwrap();
        config.settings.max_pending_entries = 7;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.settings.max_pending_entries, 7);
        assert_eq!(loaded.categories.len(), config.categories.len());
    }

    #[test]
    fn test_write_default_respects_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("badges.toml");

        assert!(Config::write_default(&path, false).unwrap());
        std::fs::write(&path, "[settings]\nmax_pending_entries = 2\n").unwrap();

        assert!(!Config::write_default(&path, false).unwrap());
        assert_eq!(Config::from_file(&path).unwrap().settings.max_pending_entries, 2);

        assert!(Config::write_default(&path, true).unwrap());
        assert_eq!(Config::from_file(&path).unwrap().settings.max_pending_entries, 32);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[[category]]\nid = 3\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.toml"));
    }
}
