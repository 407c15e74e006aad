//! Storage configuration
//! Loaded from ~/.config/mediacapture/mediacapture.toml
//!
//! ```toml
//! base_dir = "/home/me/Documents"       # default: platform documents dir
//! preferences_file = "preferences.json" # key-value file under Config/
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SettingsError};
use crate::kv::JsonFileStore;
use crate::storage::{LocalFileSystem, MediaDirectories};
use crate::store::SettingsStore;

pub const DEFAULT_PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Root for Config/, VideoData/ and ImageData/
    pub base_dir: Option<PathBuf>,
    /// File name of the key-value store inside Config/
    pub preferences_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            preferences_file: DEFAULT_PREFERENCES_FILE.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: StorageConfig = toml::from_str(s).map_err(|e| SettingsError::Config(e.to_string()))?;
        if config.preferences_file.trim().is_empty() {
            return Err(SettingsError::Config("preferences_file must not be empty".into()));
        }
        Ok(config)
    }

    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mediacapture")
            .join("mediacapture.toml")
    }

    /// Load from `path`; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| SettingsError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    /// Explicit base dir, else the documents dir, else the working directory
    pub fn resolve_base_dir(&self) -> PathBuf {
        self.base_dir
            .clone()
            .or_else(dirs::document_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Wire up the local filesystem and JSON preferences store.
    ///
    /// Creates `Config/` if needed; the preferences file itself is only
    /// written on the first flush.
    pub fn open(&self) -> Result<(SettingsStore<JsonFileStore>, MediaDirectories<LocalFileSystem>)> {
        let dirs = MediaDirectories::new(LocalFileSystem::new(self.resolve_base_dir()));
        let prefs = dirs.config_directory()?.join(&self.preferences_file);
        let store = SettingsStore::new(JsonFileStore::open(prefs)?);
        Ok((store, dirs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(StorageConfig::from_toml("").unwrap(), StorageConfig::default());
    }

    #[test]
    fn parses_overrides() {
        let config = StorageConfig::from_toml(
            r#"
base_dir = "/srv/capture"
preferences_file = "capture.json"
"#,
        )
        .unwrap();
        assert_eq!(config.base_dir, Some(PathBuf::from("/srv/capture")));
        assert_eq!(config.preferences_file, "capture.json");
        assert_eq!(config.resolve_base_dir(), PathBuf::from("/srv/capture"));
    }

    #[test]
    fn rejects_unknown_keys_and_empty_file_name() {
        assert!(matches!(
            StorageConfig::from_toml("base = 1"),
            Err(SettingsError::Config(_))
        ));
        assert!(matches!(
            StorageConfig::from_toml("preferences_file = \"  \""),
            Err(SettingsError::Config(_))
        ));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = StorageConfig::load(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config, StorageConfig::default());
    }

    #[test]
    fn open_places_preferences_under_config_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = StorageConfig {
            base_dir: Some(temp.path().to_path_buf()),
            ..StorageConfig::default()
        };
        let (store, _dirs) = config.open().unwrap();
        assert_eq!(
            store.backend().path(),
            temp.path().join("Config").join("preferences.json")
        );
        assert!(temp.path().join("Config").is_dir());
    }
}
