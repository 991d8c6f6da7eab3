use crate::config::{Configuration, FeatureToggles};
use crate::error::StorageError;
use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const USER_CONFIG_FILE: &str = "user_config.json";
const UI_SETTINGS_FILE: &str = "ui_settings.json";

/// Storage abstraction for the live rule configuration and the UI settings.
///
/// The two records are keyed independently: losing one never touches the other.
pub trait ConfigStorage {
    /// `Ok(None)` when nothing has been persisted yet; `Err` when the record
    /// exists but cannot be read or parsed.
    fn get_user_config(&self) -> Result<Option<Configuration>, StorageError>;
    fn store_user_config(&self, config: &Configuration) -> Result<()>;

    fn get_ui_settings(&self) -> Result<Option<FeatureToggles>, StorageError>;
    fn store_ui_settings(&self, toggles: &FeatureToggles) -> Result<()>;

    /// Where records live, for display. `None` for storage without a location.
    fn location(&self) -> Option<PathBuf>;
}

/// File-based storage: one JSON document per record inside a config directory.
pub struct FileStorage {
    config_dir: PathBuf,
}

impl FileStorage {
    /// The directory is created on first write.
    pub fn new(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
        }
    }

    pub fn user_config_path(&self) -> PathBuf {
        self.config_dir.join(USER_CONFIG_FILE)
    }

    pub fn ui_settings_path(&self) -> PathBuf {
        self.config_dir.join(UI_SETTINGS_FILE)
    }

    fn read_record<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, StorageError> {
        if !path.exists() {
            return Ok(None);
        }
        let json_str = fs::read_to_string(path).map_err(|source| StorageError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let record = serde_json::from_str(&json_str).map_err(|e| StorageError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Some(record))
    }

    fn write_record<T: Serialize>(&self, path: &Path, record: &T) -> Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        let json_str = serde_json::to_string_pretty(record)
            .map_err(|e| anyhow!("Failed to serialize {}: {}", path.display(), e))?;
        fs::write(path, json_str)?;
        Ok(())
    }
}

impl ConfigStorage for FileStorage {
    fn get_user_config(&self) -> Result<Option<Configuration>, StorageError> {
        self.read_record(&self.user_config_path())
    }

    fn store_user_config(&self, config: &Configuration) -> Result<()> {
        self.write_record(&self.user_config_path(), config)
    }

    fn get_ui_settings(&self) -> Result<Option<FeatureToggles>, StorageError> {
        self.read_record(&self.ui_settings_path())
    }

    fn store_ui_settings(&self, toggles: &FeatureToggles) -> Result<()> {
        self.write_record(&self.ui_settings_path(), toggles)
    }

    fn location(&self) -> Option<PathBuf> {
        Some(self.config_dir.clone())
    }
}

/// No-op storage implementation that never persists anything
pub struct NoOpStorage;

impl Default for NoOpStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigStorage for NoOpStorage {
    fn get_user_config(&self) -> Result<Option<Configuration>, StorageError> {
        Ok(None) // Always a first run
    }

    fn store_user_config(&self, _config: &Configuration) -> Result<()> {
        Ok(()) // No-op
    }

    fn get_ui_settings(&self) -> Result<Option<FeatureToggles>, StorageError> {
        Ok(None)
    }

    fn store_ui_settings(&self, _toggles: &FeatureToggles) -> Result<()> {
        Ok(())
    }

    fn location(&self) -> Option<PathBuf> {
        None
    }
}
