use anyhow::Result;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "kamr";

#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding the launcher configuration file.
    pub config_dir: PathBuf,

    /// Directory holding the installed-versions state file and
    /// transient installer downloads.
    pub data_dir: PathBuf,
}

impl Default for AppPaths {
    fn default() -> Self {
        Self {
            config_dir: Self::default_config_dir(),
            data_dir: Self::default_data_dir(),
        }
    }
}

impl AppPaths {
    /// Places both directories under a single root. Used by tests and the
    /// `--datadir` override.
    pub fn new_for_path(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    /// Sets up the launcher directories, creating them if needed.
    pub fn setup(root: Option<&Path>) -> Result<Self> {
        let paths = match root {
            Some(root) => Self::new_for_path(root),
            None => Self::default(),
        };

        std::fs::create_dir_all(&paths.config_dir)?;
        std::fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".config"))
            .join(APP_DIR_NAME)
    }

    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"))
            .join(APP_DIR_NAME)
    }
}
