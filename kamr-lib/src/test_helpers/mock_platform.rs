use crate::error::{LauncherError, LauncherResult};
use crate::platform::PlatformAdapter;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Platform double recording installer runs and launches.
pub struct MockPlatform {
    automated_install: bool,
    fail_install: bool,
    pub installer_runs: Mutex<Vec<(PathBuf, PathBuf)>>,
    pub launches: Mutex<Vec<(PathBuf, String)>>,
}

impl MockPlatform {
    /// Behaves like the platform with unattended install support.
    pub fn automated() -> Self {
        Self {
            automated_install: true,
            fail_install: false,
            installer_runs: Mutex::new(Vec::new()),
            launches: Mutex::new(Vec::new()),
        }
    }

    /// Behaves like a platform where only manual installation works.
    pub fn manual_only() -> Self {
        Self {
            automated_install: false,
            ..Self::automated()
        }
    }

    /// Makes every installer run exit nonzero.
    pub fn failing(mut self) -> Self {
        self.fail_install = true;
        self
    }
}

impl PlatformAdapter for MockPlatform {
    fn supports_automated_install(&self) -> bool {
        self.automated_install
    }

    async fn run_installer(&self, installer_path: &Path, install_dir: &Path) -> LauncherResult<()> {
        self.installer_runs
            .lock()
            .unwrap()
            .push((installer_path.to_path_buf(), install_dir.to_path_buf()));

        if self.fail_install {
            return Err(LauncherError::InstallerExited {
                code: 2,
                stderr: "mock installer failure".to_string(),
            });
        }

        Ok(())
    }

    fn launch(&self, executable_path: &Path, launch_args: &str) -> LauncherResult<()> {
        self.launches
            .lock()
            .unwrap()
            .push((executable_path.to_path_buf(), launch_args.to_string()));
        Ok(())
    }
}
