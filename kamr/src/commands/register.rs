use crate::cli::GlobalArgs;
use crate::commands::services;
use crate::ui;
use anyhow::{Result, bail};
use chrono::Utc;
use clap::Args;
use kamr_lib::game::{GAME_EXECUTABLE, UNKNOWN_VERSION, detect_version};
use kamr_lib::registry::InstalledVersion;
use std::path::PathBuf;

#[derive(Args)]
pub struct RegisterCommand {
    /// Path to the game executable, or to the folder containing it
    pub path: PathBuf,

    /// Display name (defaults to the detected version)
    #[arg(long)]
    pub name: Option<String>,

    /// Custom launch command template; %exe% expands to the executable name
    #[arg(long)]
    pub launch_args: Option<String>,
}

impl RegisterCommand {
    pub async fn run(self, global_args: GlobalArgs) -> Result<()> {
        let services = services(&global_args)?;

        let executable_path = if self.path.is_dir() {
            self.path.join(GAME_EXECUTABLE)
        } else {
            self.path.clone()
        };

        if !executable_path.exists() {
            ui::warning(&format!(
                "{} does not exist; registering it anyway.",
                executable_path.display()
            ));
        }

        let executable_path = executable_path.to_string_lossy().into_owned();
        let state = services.registry.read();
        if state
            .installed_versions
            .iter()
            .any(|v| v.executable_path == executable_path)
        {
            bail!("That executable is already registered.");
        }

        let version = detect_version(executable_path.as_ref());
        let name = self.name.clone().unwrap_or_else(|| {
            if version == UNKNOWN_VERSION {
                fallback_name(&executable_path)
            } else {
                version.clone()
            }
        });

        services.registry.add_installed_version(InstalledVersion {
            name: name.clone(),
            version: version.clone(),
            executable_path,
            installed_at: Utc::now(),
            order: 0,
            launch_args: self.launch_args.unwrap_or_default(),
        });

        ui::success(&format!("Registered {name} ({version})"));
        Ok(())
    }
}

/// The install folder's name, when no version token was detected.
fn fallback_name(executable_path: &str) -> String {
    std::path::Path::new(executable_path)
        .parent()
        .and_then(|folder| folder.file_name())
        .map(|folder| folder.to_string_lossy().into_owned())
        .unwrap_or_else(|| "KaM Remake".to_string())
}
