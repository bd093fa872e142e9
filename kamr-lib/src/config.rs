use crate::paths::AppPaths;
use crate::store::{Migration, VersionedStore};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CONFIG_SCHEMA_VERSION: u64 = 1;
const CONFIG_FILENAME: &str = "config.json";

/// Launcher preferences. One file per installation of the launcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LauncherConfig {
    #[serde(rename = "_schemaVersion")]
    pub schema_version: u64,

    /// Include versions the catalog marks as hidden in listings.
    pub show_hidden_versions: bool,

    /// Default directory offered when installing a new version.
    pub default_install_path: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            show_hidden_versions: false,
            default_install_path: String::new(),
        }
    }
}

pub struct ConfigStore {
    store: VersionedStore<LauncherConfig>,
}

impl ConfigStore {
    pub fn new(paths: &AppPaths) -> Result<Self> {
        let migrations: Vec<Migration> = vec![migrate_v0];
        Ok(Self {
            store: VersionedStore::new(
                &paths.config_dir,
                CONFIG_FILENAME,
                CONFIG_SCHEMA_VERSION,
                migrations,
            )?,
        })
    }

    pub fn read(&self) -> LauncherConfig {
        self.store.read()
    }

    pub fn write(&self, config: &LauncherConfig) {
        self.store.write(config)
    }
}

/// v0 -> v1: files written before the schema version field was introduced
/// carry the same fields, so only the version stamp changes.
fn migrate_v0(document: Map<String, Value>) -> Map<String, Value> {
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_read_returns_defaults() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        let config_store = ConfigStore::new(&paths)?;

        let config = config_store.read();
        assert_eq!(config, LauncherConfig::default());
        assert!(!config.show_hidden_versions);
        assert_eq!(config.default_install_path, "");
        Ok(())
    }

    #[test]
    fn test_write_then_read_round_trips() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        let config_store = ConfigStore::new(&paths)?;

        let mut config = config_store.read();
        config.show_hidden_versions = true;
        config.default_install_path = "C:\\Games\\KaM".to_string();
        config_store.write(&config);

        assert_eq!(config_store.read(), config);
        Ok(())
    }

    #[test]
    fn test_unversioned_file_is_stamped() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        std::fs::create_dir_all(&paths.config_dir)?;
        std::fs::write(
            paths.config_dir.join(CONFIG_FILENAME),
            r#"{"showHiddenVersions": true}"#,
        )?;

        let config = ConfigStore::new(&paths)?.read();
        assert!(config.show_hidden_versions);
        assert_eq!(config.schema_version, CONFIG_SCHEMA_VERSION);
        Ok(())
    }
}
