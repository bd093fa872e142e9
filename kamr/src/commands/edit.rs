use crate::cli::GlobalArgs;
use crate::commands::{resolve_installed, services};
use crate::ui;
use anyhow::{Result, bail};
use clap::Args;
use kamr_lib::registry::InstalledVersionPatch;
use std::path::PathBuf;

#[derive(Args)]
pub struct EditCommand {
    /// Name, version, or executable path of the installation to edit
    pub version: String,

    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New launch command template; %exe% expands to the executable name,
    /// an empty string restores the default launch
    #[arg(long)]
    pub launch_args: Option<String>,

    /// New executable path
    #[arg(long)]
    pub path: Option<PathBuf>,
}

impl EditCommand {
    pub async fn run(self, global_args: GlobalArgs) -> Result<()> {
        if self.name.is_none() && self.launch_args.is_none() && self.path.is_none() {
            bail!("Nothing to change. Pass --name, --launch-args, or --path.");
        }

        let services = services(&global_args)?;

        let state = services.registry.read();
        let entry = resolve_installed(&state, &self.version)?;

        let patch = InstalledVersionPatch {
            name: self.name,
            launch_args: self.launch_args,
            executable_path: self
                .path
                .map(|path| path.to_string_lossy().into_owned()),
            order: None,
        };
        services
            .registry
            .update_installed_version(&entry.executable_path, &patch);

        ui::success(&format!("Updated {}", entry.name));
        Ok(())
    }
}
