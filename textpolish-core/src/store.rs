use crate::config::{
    load_bundled_defaults, parse_partial, CategoryConfig, Configuration, FeatureToggles,
    FileFormat, Rule, StyleDescriptor,
};
use crate::error::{ConfigError, StorageError};
use crate::storage::{ConfigStorage, NoOpStorage};
use crate::types::Category;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the live configuration came from when the store was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Previously persisted user configuration
    UserStore,
    /// Default-configuration file shipped alongside the program
    BundledFile,
    /// Compiled-in defaults (first run without a bundled file)
    CompiledDefault,
    /// Compiled-in defaults after the persisted record turned out to be malformed
    RecoveredDefault,
    /// Compiled-in defaults held in memory only: the persisted record exists
    /// but could not be read, so it is never overwritten this session
    SessionDefault,
}

/// Owner of the live rule/style configuration.
///
/// Every mutation is persisted immediately. Persistence failures are logged and
/// the session carries on with the in-memory state.
pub struct ConfigStore {
    storage: Box<dyn ConfigStorage>,
    config: Configuration,
    source: ConfigSource,
}

impl ConfigStore {
    /// Open the store: persisted user configuration, then the bundled file,
    /// then the compiled-in defaults. The first source that loads wins.
    pub fn open(storage: Box<dyn ConfigStorage>, bundled_default: Option<&Path>) -> Self {
        let (config, source) = match storage.get_user_config() {
            Ok(Some(config)) => {
                log::info!("Loaded user configuration");
                (config, ConfigSource::UserStore)
            }
            Ok(None) => Self::first_run_defaults(bundled_default),
            Err(e @ StorageError::Malformed { .. }) => {
                log::warn!("Persisted configuration is malformed, restoring defaults: {e}");
                (Configuration::compiled_default(), ConfigSource::RecoveredDefault)
            }
            Err(e @ StorageError::Unreadable { .. }) => {
                log::warn!(
                    "Persisted configuration is unreadable, using defaults for this session: {e}"
                );
                (Configuration::compiled_default(), ConfigSource::SessionDefault)
            }
        };

        let store = Self {
            storage,
            config,
            source,
        };
        if matches!(
            source,
            ConfigSource::BundledFile | ConfigSource::CompiledDefault | ConfigSource::RecoveredDefault
        ) {
            // Next run finds the user store
            store.persist();
        }
        store
    }

    /// A store backed by nothing, starting from the compiled-in defaults.
    pub fn in_memory() -> Self {
        Self::open(Box::new(NoOpStorage::new()), None)
    }

    fn first_run_defaults(bundled_default: Option<&Path>) -> (Configuration, ConfigSource) {
        if let Some(path) = bundled_default {
            match load_bundled_defaults(path) {
                Ok(config) => {
                    log::info!("Loaded default configuration from {}", path.display());
                    return (config, ConfigSource::BundledFile);
                }
                Err(e) => log::warn!("Bundled configuration unusable: {e:#}"),
            }
        }
        log::info!("Using compiled-in default configuration");
        (Configuration::compiled_default(), ConfigSource::CompiledDefault)
    }

    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Borrow the live configuration for one classify+render pass.
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Snapshot of one category.
    pub fn get(&self, category: Category) -> CategoryConfig {
        self.config.get(category).clone()
    }

    /// Snapshot of every category.
    pub fn all(&self) -> Configuration {
        self.config.clone()
    }

    pub fn enabled_patterns(&self, category: Category) -> Vec<String> {
        self.config
            .enabled_patterns(category)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn storage_location(&self) -> Option<PathBuf> {
        self.storage.location()
    }

    pub fn update_style(&mut self, category: Category, style: StyleDescriptor) {
        self.update_level(category, Some(style), None);
    }

    pub fn update_rules(&mut self, category: Category, rules: Vec<Rule>) {
        self.update_level(category, None, Some(rules));
    }

    /// Replace the style, the rule list or both, persisting once.
    pub fn update_level(
        &mut self,
        category: Category,
        style: Option<StyleDescriptor>,
        rules: Option<Vec<Rule>>,
    ) {
        if style.is_none() && rules.is_none() {
            return;
        }
        let current = self.config.get(category);
        let updated = CategoryConfig {
            style: style.unwrap_or_else(|| current.style.clone()),
            patterns: rules.unwrap_or_else(|| current.patterns.clone()),
        };
        self.config.set(category, updated);
        self.persist();
    }

    /// Append a rule. Returns false (and changes nothing) for `normal`.
    pub fn add_rule(&mut self, category: Category, rule: Rule) -> bool {
        if !category.accepts_rules() {
            log::warn!("Ignoring rule '{}': '{}' takes no rules", rule.name, category);
            return false;
        }
        self.config.get_mut(category).patterns.push(rule);
        self.persist();
        true
    }

    /// Remove the rule at `index`; out-of-range indexes are a no-op.
    pub fn remove_rule(&mut self, category: Category, index: usize) -> Option<Rule> {
        let patterns = &mut self.config.get_mut(category).patterns;
        if index >= patterns.len() {
            log::debug!("No rule #{index} in '{category}', nothing removed");
            return None;
        }
        let removed = patterns.remove(index);
        self.persist();
        Some(removed)
    }

    /// Flip the enabled flag of the rule at `index`, returning the new state.
    pub fn toggle_rule(&mut self, category: Category, index: usize) -> Option<bool> {
        let rule = self.config.get_mut(category).patterns.get_mut(index)?;
        rule.enabled = !rule.enabled;
        let enabled = rule.enabled;
        self.persist();
        Some(enabled)
    }

    /// Restore every category to the compiled-in defaults.
    pub fn reset(&mut self) {
        self.config = Configuration::compiled_default();
        log::info!("Configuration reset to defaults");
        self.persist();
    }

    /// Write the full configuration to a standalone JSON file.
    pub fn export_to(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(&self.config)?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Configuration exported to {}", path.display());
        Ok(())
    }

    /// Replace every category present in the file; others stay as they are.
    ///
    /// The file is parsed completely before anything is applied, so a failed
    /// import leaves the store untouched. Returns the replaced categories.
    pub fn import_from(&mut self, path: &Path) -> Result<Vec<Category>, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let partial = parse_partial(&contents, FileFormat::from_path(path)).map_err(|e| {
            ConfigError::Malformed {
                path: path.to_path_buf(),
                message: format!("{e:#}"),
            }
        })?;

        let replaced = self.config.apply(partial);
        log::info!(
            "Imported {} categor{} from {}",
            replaced.len(),
            if replaced.len() == 1 { "y" } else { "ies" },
            path.display()
        );
        self.persist();
        Ok(replaced)
    }

    pub fn save_ui_settings(&self, toggles: &FeatureToggles) {
        if let Err(e) = self.storage.store_ui_settings(toggles) {
            log::warn!("Failed to save UI settings: {e:#}");
        }
    }

    /// Persisted toggles, or all-enabled when missing or unreadable.
    pub fn load_ui_settings(&self) -> FeatureToggles {
        match self.storage.get_ui_settings() {
            Ok(Some(toggles)) => toggles,
            Ok(None) => FeatureToggles::default(),
            Err(e) => {
                log::warn!("Failed to load UI settings, using defaults: {e}");
                FeatureToggles::default()
            }
        }
    }

    fn persist(&self) {
        if self.source == ConfigSource::SessionDefault {
            log::debug!("Persisted configuration is unreadable, keeping edits in memory");
            return;
        }
        if let Err(e) = self.storage.store_user_config(&self.config) {
            log::warn!("Failed to persist configuration: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStorage;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn file_store(dir: &TempDir) -> ConfigStore {
        ConfigStore::open(Box::new(FileStorage::new(dir.path())), None)
    }

    #[test]
    fn first_run_uses_compiled_defaults_and_persists_them() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        assert_eq!(store.source(), ConfigSource::CompiledDefault);
        assert!(dir.path().join("user_config.json").exists());

        let reopened = file_store(&dir);
        assert_eq!(reopened.source(), ConfigSource::UserStore);
        assert_eq!(reopened.all(), Configuration::compiled_default());
    }

    #[test]
    fn bundled_file_wins_over_compiled_defaults_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = dir.path().join("app_config.json");
        fs::write(
            &bundled,
            r#"{"default_user_config": {"h1": {"style": {"font_family": "黑体"}, "patterns": []}}}"#,
        )
        .unwrap();

        let store = ConfigStore::open(
            Box::new(FileStorage::new(&dir.path().join("store"))),
            Some(&bundled),
        );
        assert_eq!(store.source(), ConfigSource::BundledFile);
        assert_eq!(store.get(Category::H1).style.font_family, "黑体");
        assert_eq!(store.get(Category::H2), Configuration::compiled_default().get(Category::H2).clone());
    }

    #[test]
    fn missing_bundled_file_falls_back_to_compiled_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(
            Box::new(FileStorage::new(dir.path())),
            Some(&dir.path().join("absent.json")),
        );
        assert_eq!(store.source(), ConfigSource::CompiledDefault);
    }

    #[test]
    fn malformed_store_recovers_and_rewrites_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("user_config.json"), "garbage").unwrap();

        let store = file_store(&dir);
        assert_eq!(store.source(), ConfigSource::RecoveredDefault);
        assert_eq!(file_store(&dir).source(), ConfigSource::UserStore);
    }

    /// Storage whose record exists but cannot be read; counts write attempts.
    struct UnreadableStorage {
        writes: Rc<Cell<usize>>,
    }

    impl ConfigStorage for UnreadableStorage {
        fn get_user_config(&self) -> Result<Option<Configuration>, StorageError> {
            Err(StorageError::Unreadable {
                path: PathBuf::from("user_config.json"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }

        fn store_user_config(&self, _config: &Configuration) -> anyhow::Result<()> {
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        fn get_ui_settings(&self) -> Result<Option<FeatureToggles>, StorageError> {
            Ok(None)
        }

        fn store_ui_settings(&self, _toggles: &FeatureToggles) -> anyhow::Result<()> {
            Ok(())
        }

        fn location(&self) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn unreadable_store_is_never_overwritten() {
        let writes = Rc::new(Cell::new(0));
        let mut store = ConfigStore::open(
            Box::new(UnreadableStorage {
                writes: Rc::clone(&writes),
            }),
            None,
        );
        assert_eq!(store.source(), ConfigSource::SessionDefault);
        assert_eq!(store.all(), Configuration::compiled_default());

        assert!(store.add_rule(Category::H3, Rule::new(r"^\d+\.", "数字序号")));
        store.reset();
        assert_eq!(store.get(Category::H3).patterns.len(), 1);
        // Session state stays usable while nothing reaches storage
        assert!(store.add_rule(Category::H3, Rule::new(r"^\d+、", "数字顿号")));
        assert_eq!(store.get(Category::H3).patterns.len(), 2);
        assert_eq!(writes.get(), 0);
    }

    #[test]
    fn unreadable_file_store_keeps_the_record_in_place() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("user_config.json")).unwrap();

        let mut store = file_store(&dir);
        assert_eq!(store.source(), ConfigSource::SessionDefault);
        store.update_rules(Category::H1, Vec::new());
        assert!(dir.path().join("user_config.json").is_dir());
    }

    #[test]
    fn overflowing_length_never_reaches_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = file_store(&dir);
        assert!(store.add_rule(Category::H1, Rule::new(r"^附录", "附录")));

        let overflowing = format!("{}pt", "9".repeat(400));
        assert!(overflowing.parse::<crate::config::Length>().is_err());

        let import = dir.path().join("huge.json");
        fs::write(
            &import,
            format!(r#"{{"h2": {{"style": {{"font_size": "{overflowing}"}}, "patterns": []}}}}"#),
        )
        .unwrap();
        assert!(matches!(
            store.import_from(&import),
            Err(ConfigError::Malformed { .. })
        ));

        let reopened = file_store(&dir);
        assert_eq!(reopened.source(), ConfigSource::UserStore);
        assert_eq!(reopened.get(Category::H1).patterns.len(), 3);
        assert_eq!(
            reopened.get(Category::H2),
            Configuration::compiled_default().get(Category::H2).clone()
        );
    }

    #[test]
    fn mutations_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = file_store(&dir);
        assert!(store.add_rule(Category::H3, Rule::new(r"^\d+\.", "数字序号")));
        assert_eq!(store.toggle_rule(Category::H1, 0), Some(false));
        assert!(store.remove_rule(Category::Special, 1).is_some());

        let reopened = file_store(&dir);
        assert_eq!(reopened.get(Category::H3).patterns.len(), 2);
        assert!(!reopened.get(Category::H1).patterns[0].enabled);
        assert_eq!(reopened.get(Category::Special).patterns.len(), 2);
        assert_eq!(reopened.enabled_patterns(Category::H1), vec![r"^前言$".to_string()]);
    }

    #[test]
    fn out_of_range_indexes_are_noops() {
        let mut store = ConfigStore::in_memory();
        let before = store.all();
        assert!(store.remove_rule(Category::H1, 99).is_none());
        assert!(store.toggle_rule(Category::H2, 2).is_none());
        assert!(store.remove_rule(Category::Normal, 0).is_none());
        assert_eq!(store.all(), before);
    }

    #[test]
    fn normal_never_gains_rules() {
        let mut store = ConfigStore::in_memory();
        assert!(!store.add_rule(Category::Normal, Rule::new("^x", "x")));
        store.update_rules(Category::Normal, vec![Rule::new("^y", "y")]);
        assert!(store.get(Category::Normal).patterns.is_empty());
    }

    #[test]
    fn update_level_replaces_style_and_rules_together() {
        let mut store = ConfigStore::in_memory();
        let style = StyleDescriptor::new("宋体", 12.0);
        store.update_level(Category::H2, Some(style.clone()), Some(Vec::new()));
        assert_eq!(store.get(Category::H2).style, style);
        assert!(store.get(Category::H2).patterns.is_empty());

        store.update_style(Category::H3, style.clone());
        assert_eq!(store.get(Category::H3).style, style);
        assert_eq!(store.get(Category::H3).patterns.len(), 1);
    }

    #[test]
    fn reset_restores_compiled_defaults() {
        let mut store = ConfigStore::in_memory();
        store.update_rules(Category::H1, Vec::new());
        store.update_style(Category::Normal, StyleDescriptor::new("宋体", 10.0));
        store.reset();
        for category in Category::ALL {
            assert_eq!(
                &store.get(category),
                Configuration::compiled_default().get(category)
            );
        }
    }

    #[test]
    fn export_then_import_restores_the_exported_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let mut store = ConfigStore::in_memory();
        store.toggle_rule(Category::Special, 2);
        store.add_rule(Category::H2, Rule::new(r"^\d+、", "数字顿号").with_description("1、2、"));
        let exported = store.all();
        store.export_to(&path).unwrap();

        store.reset();
        let replaced = store.import_from(&path).unwrap();
        assert_eq!(replaced, Category::ALL.to_vec());
        assert_eq!(store.all(), exported);
    }

    #[test]
    fn import_leaves_absent_categories_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.yaml");
        fs::write(&path, "h2:\n  style:\n    font_family: 黑体\n  patterns: []\n").unwrap();

        let mut store = ConfigStore::in_memory();
        store.update_rules(Category::H1, Vec::new());
        assert_eq!(store.import_from(&path).unwrap(), vec![Category::H2]);
        assert!(store.get(Category::H1).patterns.is_empty());
        assert!(store.get(Category::H2).patterns.is_empty());
        assert_eq!(store.get(Category::H2).style.font_family, "黑体");
    }

    #[test]
    fn failed_import_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(
            &path,
            r#"{"h1": {"style": {}, "patterns": []}, "h2": {"style": {"font_size": "huge"}}}"#,
        )
        .unwrap();

        let mut store = ConfigStore::in_memory();
        let before = store.all();
        assert!(matches!(
            store.import_from(&path),
            Err(ConfigError::Malformed { .. })
        ));
        assert!(matches!(
            store.import_from(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
        assert_eq!(store.all(), before);
    }

    #[test]
    fn export_to_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_memory();
        let result = store.export_to(&dir.path().join("no-such-dir").join("out.json"));
        assert!(matches!(result, Err(ConfigError::Write { .. })));
    }

    #[test]
    fn ui_settings_default_to_all_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        assert_eq!(store.load_ui_settings(), FeatureToggles::default());

        let toggles = FeatureToggles {
            enable_special: false,
            ..FeatureToggles::default()
        };
        store.save_ui_settings(&toggles);
        assert_eq!(file_store(&dir).load_ui_settings(), toggles);
        // Rule configuration untouched by UI settings
        assert_eq!(file_store(&dir).all(), Configuration::compiled_default());
    }
}
