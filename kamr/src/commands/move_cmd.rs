use crate::cli::GlobalArgs;
use crate::commands::{ordered, resolve_installed, services};
use crate::ui;
use anyhow::{Result, bail};
use clap::{Args, ValueEnum};
use kamr_lib::registry::InstalledVersionPatch;

#[derive(Clone, Copy, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Args)]
pub struct MoveCommand {
    /// Name, version, or executable path of the installation to move
    pub version: String,

    /// Where to move it
    #[arg(value_enum)]
    pub direction: Direction,
}

impl MoveCommand {
    pub async fn run(self, global_args: GlobalArgs) -> Result<()> {
        let services = services(&global_args)?;

        let state = services.registry.read();
        let entry = resolve_installed(&state, &self.version)?;

        let versions = ordered(&state);
        let index = versions
            .iter()
            .position(|v| v.executable_path == entry.executable_path)
            .expect("resolved entry is in the list");

        let neighbor_index = match self.direction {
            Direction::Up => {
                let Some(above) = index.checked_sub(1) else {
                    bail!("{} is already first in the list", entry.name);
                };
                above
            }
            Direction::Down => {
                if index + 1 >= versions.len() {
                    bail!("{} is already last in the list", entry.name);
                }
                index + 1
            }
        };
        let neighbor = &versions[neighbor_index];

        // Swap display orders, one update per entry.
        services.registry.update_installed_version(
            &entry.executable_path,
            &InstalledVersionPatch {
                order: Some(neighbor.order),
                ..InstalledVersionPatch::default()
            },
        );
        services.registry.update_installed_version(
            &neighbor.executable_path,
            &InstalledVersionPatch {
                order: Some(entry.order),
                ..InstalledVersionPatch::default()
            },
        );

        ui::success(&format!("Moved {}", entry.name));
        Ok(())
    }
}
