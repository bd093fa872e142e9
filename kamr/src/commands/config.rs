use crate::cli::GlobalArgs;
use crate::commands::services;
use crate::ui;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct ConfigCommand {
    /// Include versions the catalog marks as hidden in listings
    #[arg(long)]
    pub show_hidden: Option<bool>,

    /// Default directory offered when installing a new version
    #[arg(long)]
    pub install_path: Option<String>,
}

impl ConfigCommand {
    pub async fn run(self, global_args: GlobalArgs) -> Result<()> {
        let services = services(&global_args)?;
        let mut config = services.config_store.read();

        if self.show_hidden.is_none() && self.install_path.is_none() {
            let install_path = if config.default_install_path.is_empty() {
                "(not set)".dimmed().to_string()
            } else {
                config.default_install_path.clone()
            };
            ui::info(&format!(
                "{} {}",
                "Show hidden versions:".cyan(),
                config.show_hidden_versions
            ));
            ui::info(&format!("{} {}", "Default install path:".cyan(), install_path));
            return Ok(());
        }

        if let Some(show_hidden) = self.show_hidden {
            config.show_hidden_versions = show_hidden;
        }
        if let Some(install_path) = self.install_path {
            config.default_install_path = install_path;
        }
        services.config_store.write(&config);

        ui::success("Settings updated.");
        Ok(())
    }
}
