//! Per-user directories and the bundled default configuration.
//!
//! The rule store lives in the platform config directory
//! (e.g. ~/.config/TextPolish) unless overridden on the command line.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use textpolish_core::{ConfigStore, FileStorage};

const APP_DIR_NAME: &str = "TextPolish";
const BUNDLED_CONFIG_FILE: &str = "app_config.json";

/// Resolves where TextPolish keeps its persisted state
pub struct AppDirs {
    config_dir: PathBuf,
}

impl AppDirs {
    /// Use the platform config directory
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine the user config directory"))?;
        Ok(Self {
            config_dir: base.join(APP_DIR_NAME),
        })
    }

    /// Use an explicit directory (`--config-dir`)
    pub fn with_config_dir(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
        }
    }

    /// `--config-dir` when given, the platform directory otherwise
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self> {
        match override_dir {
            Some(dir) => Ok(Self::with_config_dir(dir)),
            None => Self::new(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.config_dir)
    }

    /// Open the rule store, falling back to the bundled file on first run
    pub fn open_store(&self, bundled_override: Option<&Path>) -> ConfigStore {
        let bundled = match bundled_override {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_bundled_config(),
        };
        if let Some(path) = &bundled {
            log::debug!("Bundled config candidate: {}", path.display());
        }
        ConfigStore::open(Box::new(self.storage()), bundled.as_deref())
    }

    /// Locate the default configuration shipped with the program
    pub fn find_bundled_config() -> Option<PathBuf> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));

        let mut candidates = Vec::new();
        // Installed alongside binary
        if let Some(dir) = &exe_dir {
            candidates.push(dir.join("config").join(BUNDLED_CONFIG_FILE));
            candidates.push(dir.join(BUNDLED_CONFIG_FILE));
        }
        // Running from the workspace root or from textpolish-cli/
        candidates.push(PathBuf::from("textpolish-core/config").join(BUNDLED_CONFIG_FILE));
        candidates.push(PathBuf::from("../textpolish-core/config").join(BUNDLED_CONFIG_FILE));
        // Source tree this binary was built from
        candidates.push(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("../textpolish-core/config")
                .join(BUNDLED_CONFIG_FILE),
        );

        candidates.into_iter().find(|candidate| candidate.is_file())
    }
}
