pub mod config;
pub mod edit;
pub mod install;
pub mod launch;
pub mod list;
pub mod move_cmd;
pub mod register;
pub mod remove;

use anyhow::{Result, bail};
use kamr_lib::catalog::{DEFAULT_API_BASE_URL, HttpCatalogClient};
use kamr_lib::config::ConfigStore;
use kamr_lib::paths::AppPaths;
use kamr_lib::registry::{InstallationRegistry, InstalledVersion, LauncherState};

use crate::cli::GlobalArgs;

/// The components every command works against, constructed once per
/// invocation and passed explicitly.
pub struct Services {
    pub paths: AppPaths,
    pub config_store: ConfigStore,
    pub registry: InstallationRegistry,
    pub catalog: HttpCatalogClient,
}

pub fn services(global_args: &GlobalArgs) -> Result<Services> {
    let paths = AppPaths::setup(global_args.datadir.as_deref())?;
    let config_store = ConfigStore::new(&paths)?;
    let registry = InstallationRegistry::new(&paths)?;
    let catalog = HttpCatalogClient::new(
        global_args
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
    );

    Ok(Services {
        paths,
        config_store,
        registry,
        catalog,
    })
}

/// Installed versions in display order.
pub fn ordered(state: &LauncherState) -> Vec<InstalledVersion> {
    let mut versions = state.installed_versions.clone();
    versions.sort_by_key(|v| v.order);
    versions
}

/// Finds an installed version by display name, version identifier, or
/// executable path, in that order of preference.
pub fn resolve_installed(state: &LauncherState, selector: &str) -> Result<InstalledVersion> {
    let found = state
        .installed_versions
        .iter()
        .find(|v| v.name == selector)
        .or_else(|| {
            state
                .installed_versions
                .iter()
                .find(|v| v.version.eq_ignore_ascii_case(selector))
        })
        .or_else(|| {
            state
                .installed_versions
                .iter()
                .find(|v| v.executable_path == selector)
        });

    match found {
        Some(version) => Ok(version.clone()),
        None => {
            let known: Vec<&str> = state
                .installed_versions
                .iter()
                .map(|v| v.name.as_str())
                .collect();
            if known.is_empty() {
                bail!("No versions registered yet. Run `kamr install` or `kamr register` first.");
            }
            bail!(
                "No installed version matches '{selector}'. Known versions: {}",
                known.join(", ")
            );
        }
    }
}
