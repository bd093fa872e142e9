use crate::cli::GlobalArgs;
use crate::commands::{Services, services};
use crate::ui;
use anyhow::{Context, Result, anyhow};
use clap::Args;
use kamr_lib::catalog::{CatalogClient, GameVersion};
use kamr_lib::installer::{DownloadProgress, InstallOutcome, ProgressStage, install_version};
use kamr_lib::logging::download_bar_style;
use kamr_lib::platform::{NativePlatform, PlatformAdapter};
use std::path::{Path, PathBuf};
use tracing::instrument;
use tracing_indicatif::span_ext::IndicatifSpanExt;

#[derive(Args)]
pub struct InstallCommand {
    /// The version to install (e.g. r10745)
    /// If not provided, installs the newest version in the catalog
    pub version: Option<String>,

    /// Display name for the new installation (defaults to the version name)
    #[arg(long)]
    pub name: Option<String>,

    /// Directory to install into (defaults to the configured install path)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

impl InstallCommand {
    pub async fn run(self, global_args: GlobalArgs) -> Result<()> {
        let services = services(&global_args)?;
        let platform = NativePlatform;
        let config = services.config_store.read();

        let versions = services.catalog.versions().await.ok_or_else(|| {
            anyhow!("Could not retrieve the version list. Check your internet connection.")
        })?;

        let version = match &self.version {
            Some(name) => versions
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(name))
                .cloned()
                .ok_or_else(|| anyhow!("Version {name} was not found in the catalog"))?,
            None => versions
                .iter()
                .filter(|v| !v.hidden || config.show_hidden_versions)
                .max_by_key(|v| v.version_order)
                .cloned()
                .ok_or_else(|| anyhow!("The catalog lists no installable versions"))?,
        };

        let name = self.name.clone().unwrap_or_else(|| version.name.clone());

        let install_dir = match &self.dir {
            Some(dir) => dir.clone(),
            None if !config.default_install_path.is_empty() => {
                PathBuf::from(&config.default_install_path)
            }
            // Only needed where the installer actually runs.
            None if !platform.supports_automated_install() => PathBuf::new(),
            None => {
                return Err(anyhow!(
                    "No install directory configured. Pass --dir or set one with `kamr config --install-path <dir>`."
                ));
            }
        };

        let outcome = run_pipeline(&services, &platform, &version, &install_dir, &name)
            .await
            .context(format!("Failed to install version {}", version.name))?;

        match outcome.manual_install_path {
            Some(installer_path) => {
                ui::info(
                    "Download complete! Automatic installation is not supported on this \
                     platform, please install the game manually using the downloaded installer.",
                );
                ui::info(&format!("Installer saved to: {}", installer_path.display()));
                ui::tip("Run `kamr register <folder>` once the game is installed.");
            }
            None => {
                ui::success(&format!("Installed {} to {}", name, install_dir.display()));
                ui::tip(&format!("Run `kamr launch {name}` to start the game."));
            }
        }

        Ok(())
    }
}

#[instrument(skip_all)]
async fn run_pipeline(
    services: &Services,
    platform: &NativePlatform,
    version: &GameVersion,
    install_dir: &Path,
    name: &str,
) -> Result<InstallOutcome> {
    let current_span = tracing::Span::current();
    current_span.pb_set_style(&download_bar_style()?);
    current_span.pb_set_message(&format!("Downloading {}...", version.name));

    let mut on_progress = |progress: DownloadProgress| {
        let span = tracing::Span::current();
        match progress.stage {
            ProgressStage::Downloading => {
                if progress.total_bytes > 0 {
                    span.pb_set_length(progress.total_bytes);
                }
                span.pb_set_position(progress.bytes_downloaded);
            }
            ProgressStage::Verifying => span.pb_set_message("Verifying checksum..."),
            ProgressStage::Writing => span.pb_set_message("Writing installer..."),
            ProgressStage::Installing => span.pb_set_message("Running installer..."),
        }
    };

    let outcome = install_version(
        &services.paths,
        &services.catalog,
        &services.registry,
        platform,
        &version.name,
        install_dir,
        name,
        &mut on_progress,
    )
    .await?;

    Ok(outcome)
}
