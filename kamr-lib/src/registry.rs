use crate::game::GAME_EXECUTABLE;
use crate::paths::AppPaths;
use crate::store::{Migration, VersionedStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STATE_SCHEMA_VERSION: u64 = 3;
const STATE_FILENAME: &str = "state.json";

/// One registered game installation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstalledVersion {
    /// User-defined display name. Defaults to the version string on install.
    pub name: String,

    /// Version identifier in rXXXXX format, or "unknown" if detection failed.
    pub version: String,

    /// Absolute path to the game executable. Uniqueness key; the store does
    /// not enforce it, callers must not violate it.
    pub executable_path: String,

    /// When this version was installed or registered.
    pub installed_at: DateTime<Utc>,

    /// Display and launch order. Lower values appear first.
    pub order: i64,

    /// Custom launch command template. `%exe%` is replaced with the
    /// executable name. Empty string means the default launch path.
    pub launch_args: String,
}

/// The full persisted collection of installed versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LauncherState {
    #[serde(rename = "_schemaVersion")]
    pub schema_version: u64,
    pub installed_versions: Vec<InstalledVersion>,
}

impl Default for LauncherState {
    fn default() -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            installed_versions: Vec::new(),
        }
    }
}

/// Fields of an installed version that may be updated in place.
#[derive(Debug, Clone, Default)]
pub struct InstalledVersionPatch {
    pub name: Option<String>,
    pub order: Option<i64>,
    pub launch_args: Option<String>,
    pub executable_path: Option<String>,
}

/// Read-modify-write operations over the installed-versions file.
///
/// Every operation reads the whole state, mutates it, and writes it back.
/// Single-writer per process; concurrent mutators would be last-write-wins.
pub struct InstallationRegistry {
    store: VersionedStore<LauncherState>,
}

impl InstallationRegistry {
    pub fn new(paths: &AppPaths) -> Result<Self> {
        let migrations: Vec<Migration> =
            vec![migrate_v0, migrate_v1_launch_args, migrate_v2_executable_path];
        Ok(Self {
            store: VersionedStore::new(
                &paths.data_dir,
                STATE_FILENAME,
                STATE_SCHEMA_VERSION,
                migrations,
            )?,
        })
    }

    pub fn read(&self) -> LauncherState {
        self.store.read()
    }

    /// Adds a newly installed version and persists the state.
    /// Order is assigned as last in the current list.
    pub fn add_installed_version(&self, mut version: InstalledVersion) {
        let mut state = self.read();
        let max_order = state
            .installed_versions
            .iter()
            .map(|v| v.order)
            .max()
            .unwrap_or(-1);
        version.order = max_order + 1;
        state.installed_versions.push(version);
        self.store.write(&state);
    }

    /// Removes an installed version by its executable path and persists the
    /// state. No-op if the path is not registered.
    pub fn remove_installed_version(&self, executable_path: &str) {
        let mut state = self.read();
        state
            .installed_versions
            .retain(|v| v.executable_path != executable_path);
        self.store.write(&state);
    }

    /// Updates mutable fields of an installed version, identified by
    /// executable path. Only the fields present in the patch are applied.
    /// No-op if the path is not registered.
    pub fn update_installed_version(&self, executable_path: &str, patch: &InstalledVersionPatch) {
        let mut state = self.read();

        let Some(entry) = state
            .installed_versions
            .iter_mut()
            .find(|v| v.executable_path == executable_path)
        else {
            return;
        };

        if let Some(name) = &patch.name {
            entry.name = name.clone();
        }
        if let Some(order) = patch.order {
            entry.order = order;
        }
        if let Some(launch_args) = &patch.launch_args {
            entry.launch_args = launch_args.clone();
        }
        if let Some(executable_path) = &patch.executable_path {
            entry.executable_path = executable_path.clone();
        }

        self.store.write(&state);
    }
}

/// v0 -> v1: files written before the schema version field was introduced
/// already match the v1 shape.
fn migrate_v0(document: Map<String, Value>) -> Map<String, Value> {
    document
}

/// v1 -> v2: add the launchArgs field to each installed version.
fn migrate_v1_launch_args(mut document: Map<String, Value>) -> Map<String, Value> {
    for_each_installed_version(&mut document, |fields| {
        fields.insert("launchArgs".to_string(), Value::String(String::new()));
    });
    document
}

/// v2 -> v3: entries stored a game folder under `path`; they now store the
/// full executable path.
fn migrate_v2_executable_path(mut document: Map<String, Value>) -> Map<String, Value> {
    for_each_installed_version(&mut document, |fields| {
        let folder = fields
            .remove("path")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let executable_path = if folder.is_empty() {
            String::new()
        } else {
            format!("{folder}/{GAME_EXECUTABLE}")
        };
        fields.insert(
            "executablePath".to_string(),
            Value::String(executable_path),
        );
    });
    document
}

fn for_each_installed_version(
    document: &mut Map<String, Value>,
    mut apply: impl FnMut(&mut Map<String, Value>),
) {
    if let Some(Value::Array(versions)) = document.get_mut("installedVersions") {
        for entry in versions {
            if let Value::Object(fields) = entry {
                apply(fields);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::UNKNOWN_VERSION;

    fn registry(paths: &AppPaths) -> InstallationRegistry {
        InstallationRegistry::new(paths).unwrap()
    }

    fn sample_version(name: &str, executable_path: &str) -> InstalledVersion {
        InstalledVersion {
            name: name.to_string(),
            version: "r10745".to_string(),
            executable_path: executable_path.to_string(),
            installed_at: Utc::now(),
            order: 0,
            launch_args: String::new(),
        }
    }

    #[test]
    fn test_add_assigns_sequential_orders() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        let registry = registry(&paths);

        registry.add_installed_version(sample_version("A", "/a/exe"));
        registry.add_installed_version(sample_version("B", "/b/exe"));

        let state = registry.read();
        assert_eq!(state.installed_versions[0].order, 0);
        assert_eq!(state.installed_versions[1].order, 1);
        Ok(())
    }

    #[test]
    fn test_add_remove_update_lifecycle() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        let registry = registry(&paths);

        registry.add_installed_version(sample_version("A", "/a/exe"));
        registry.add_installed_version(sample_version("B", "/b/exe"));

        registry.remove_installed_version("/a/exe");
        let state = registry.read();
        assert_eq!(state.installed_versions.len(), 1);
        assert_eq!(state.installed_versions[0].name, "B");
        // Orders are not compacted on removal.
        assert_eq!(state.installed_versions[0].order, 1);

        registry.update_installed_version(
            "/b/exe",
            &InstalledVersionPatch {
                name: Some("Beta".to_string()),
                ..InstalledVersionPatch::default()
            },
        );
        let state = registry.read();
        assert_eq!(state.installed_versions[0].name, "Beta");
        assert_eq!(state.installed_versions[0].order, 1);
        Ok(())
    }

    #[test]
    fn test_remove_unknown_path_is_noop() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        let registry = registry(&paths);

        registry.add_installed_version(sample_version("A", "/a/exe"));
        registry.remove_installed_version("/not/registered");

        assert_eq!(registry.read().installed_versions.len(), 1);
        Ok(())
    }

    #[test]
    fn test_update_unknown_path_is_noop() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        let registry = registry(&paths);

        registry.add_installed_version(sample_version("A", "/a/exe"));
        registry.update_installed_version(
            "/not/registered",
            &InstalledVersionPatch {
                name: Some("ignored".to_string()),
                ..InstalledVersionPatch::default()
            },
        );

        assert_eq!(registry.read().installed_versions[0].name, "A");
        Ok(())
    }

    #[test]
    fn test_update_applies_only_present_fields() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        let registry = registry(&paths);

        registry.add_installed_version(sample_version("A", "/a/exe"));
        registry.update_installed_version(
            "/a/exe",
            &InstalledVersionPatch {
                launch_args: Some("wine %exe%".to_string()),
                ..InstalledVersionPatch::default()
            },
        );

        let entry = registry.read().installed_versions[0].clone();
        assert_eq!(entry.name, "A");
        assert_eq!(entry.launch_args, "wine %exe%");
        assert_eq!(entry.executable_path, "/a/exe");
        Ok(())
    }

    #[test]
    fn test_swap_orders_via_two_updates() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        let registry = registry(&paths);

        registry.add_installed_version(sample_version("A", "/a/exe"));
        registry.add_installed_version(sample_version("B", "/b/exe"));

        registry.update_installed_version(
            "/b/exe",
            &InstalledVersionPatch {
                order: Some(0),
                ..InstalledVersionPatch::default()
            },
        );
        registry.update_installed_version(
            "/a/exe",
            &InstalledVersionPatch {
                order: Some(1),
                ..InstalledVersionPatch::default()
            },
        );

        let mut versions = registry.read().installed_versions;
        versions.sort_by_key(|v| v.order);
        assert_eq!(versions[0].name, "B");
        assert_eq!(versions[1].name, "A");
        Ok(())
    }

    #[test]
    fn test_migrates_v1_state_file() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        std::fs::create_dir_all(&paths.data_dir)?;

        // A v1 file: entries keyed by folder `path`, no launchArgs.
        std::fs::write(
            paths.data_dir.join(STATE_FILENAME),
            r#"{
                "_schemaVersion": 1,
                "installedVersions": [
                    {
                        "name": "Main",
                        "version": "r10745",
                        "path": "/games/KaM_r10745",
                        "installedAt": "2024-01-15T10:00:00Z",
                        "order": 0
                    }
                ]
            }"#,
        )?;

        let state = registry(&paths).read();
        assert_eq!(state.schema_version, STATE_SCHEMA_VERSION);

        let entry = &state.installed_versions[0];
        assert_eq!(entry.launch_args, "");
        assert_eq!(
            entry.executable_path,
            format!("/games/KaM_r10745/{GAME_EXECUTABLE}")
        );
        Ok(())
    }

    #[test]
    fn test_migrates_v2_empty_path_stays_empty() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let paths = AppPaths::new_for_path(tmp_dir.path());
        std::fs::create_dir_all(&paths.data_dir)?;

        std::fs::write(
            paths.data_dir.join(STATE_FILENAME),
            r#"{
                "_schemaVersion": 2,
                "installedVersions": [
                    {
                        "name": "Unplaced",
                        "version": "unknown",
                        "path": "",
                        "installedAt": "2024-01-15T10:00:00Z",
                        "order": 0,
                        "launchArgs": ""
                    }
                ]
            }"#,
        )?;

        let state = registry(&paths).read();
        let entry = &state.installed_versions[0];
        assert_eq!(entry.executable_path, "");
        assert_eq!(entry.version, UNKNOWN_VERSION);
        Ok(())
    }
}
