use crate::cli::GlobalArgs;
use crate::commands::{ordered, services};
use crate::ui;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use kamr_lib::catalog::CatalogClient;

#[derive(Args)]
pub struct ListCommand {
    /// Also query the catalog for versions available to download
    #[arg(long, short)]
    pub available: bool,
}

impl ListCommand {
    pub async fn run(self, global_args: GlobalArgs) -> Result<()> {
        let services = services(&global_args)?;

        let state = services.registry.read();
        let installed = ordered(&state);

        if installed.is_empty() {
            ui::info("No versions registered yet.");
            ui::tip("Run `kamr install` or `kamr register` to add one.");
        } else {
            ui::info(&"Installed versions:".cyan().to_string());
            for version in &installed {
                let args_note = if version.launch_args.is_empty() {
                    String::new()
                } else {
                    format!("  [{}]", version.launch_args)
                };
                ui::info(&format!(
                    "  {} {}  {}{}",
                    version.name.bold(),
                    format!("({})", version.version).green(),
                    version.executable_path.dimmed(),
                    args_note.dimmed()
                ));
            }
        }

        if !self.available {
            return Ok(());
        }

        let Some(mut available) = services.catalog.versions().await else {
            ui::warning("Could not reach the version catalog. Check your internet connection.");
            return Ok(());
        };

        let config = services.config_store.read();
        if !config.show_hidden_versions {
            available.retain(|v| !v.hidden);
        }
        // Newest first.
        available.sort_by_key(|v| std::cmp::Reverse(v.version_order));

        ui::info("");
        ui::info(&"Available for download:".cyan().to_string());
        for version in &available {
            let installed_marker = if installed.iter().any(|i| i.version == version.name) {
                " (installed)".dimmed().to_string()
            } else {
                String::new()
            };
            ui::info(&format!(
                "  {}  {}{}",
                version.name.bold(),
                format!("released {}", version.released_at.format("%Y-%m-%d")).dimmed(),
                installed_marker
            ));
        }

        Ok(())
    }
}
