use crate::cli::GlobalArgs;
use crate::commands::{ordered, resolve_installed, services};
use crate::ui;
use anyhow::{Result, anyhow};
use clap::Args;
use kamr_lib::platform::{NativePlatform, PlatformAdapter};
use std::path::Path;

#[derive(Args)]
pub struct LaunchCommand {
    /// Name, version, or executable path of the installation to launch
    /// If not provided, launches the first version in the list
    pub version: Option<String>,
}

impl LaunchCommand {
    pub async fn run(self, global_args: GlobalArgs) -> Result<()> {
        let services = services(&global_args)?;
        let state = services.registry.read();

        let entry = match &self.version {
            Some(selector) => resolve_installed(&state, selector)?,
            None => ordered(&state).into_iter().next().ok_or_else(|| {
                anyhow!("No versions registered yet. Run `kamr install` or `kamr register` first.")
            })?,
        };

        NativePlatform.launch(Path::new(&entry.executable_path), &entry.launch_args)?;

        ui::success(&format!("Launched {} ({})", entry.name, entry.version));
        Ok(())
    }
}
