use crate::cli::GlobalArgs;
use crate::commands::{resolve_installed, services};
use crate::ui;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct RemoveCommand {
    /// Name, version, or executable path of the installation to remove
    pub version: String,
}

impl RemoveCommand {
    pub async fn run(self, global_args: GlobalArgs) -> Result<()> {
        let services = services(&global_args)?;

        let state = services.registry.read();
        let entry = resolve_installed(&state, &self.version)?;

        services
            .registry
            .remove_installed_version(&entry.executable_path);

        ui::success(&format!("Removed {} from the launcher", entry.name));
        ui::tip("Game files are left on disk.");
        Ok(())
    }
}
