use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    config::ConfigCommand, edit::EditCommand, install::InstallCommand, launch::LaunchCommand,
    list::ListCommand, move_cmd::MoveCommand, register::RegisterCommand, remove::RemoveCommand,
};

#[derive(Parser)]
#[command(name = "kamr")]
#[command(about = "A terminal launcher for managing KaM Remake installations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global_args: GlobalArgs,
}

#[derive(clap::Args, Clone)]
pub struct GlobalArgs {
    /// Use a different location for launcher data and downloads (useful for testing)
    #[arg(long, global = true)]
    pub datadir: Option<PathBuf>,

    /// Override the version catalog base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List installed versions, and optionally those available for download
    #[command(alias = "ls")]
    List(ListCommand),

    /// Download and install a version from the catalog
    Install(InstallCommand),

    /// Launch an installed version
    Launch(LaunchCommand),

    /// Register an existing local installation
    #[command(alias = "add")]
    Register(RegisterCommand),

    /// Remove an installed version from the launcher
    #[command(alias = "rm")]
    Remove(RemoveCommand),

    /// Edit an installed version's name, launch arguments, or path
    Edit(EditCommand),

    /// Move an installed version up or down in the list
    #[command(name = "move")]
    MoveCmd(MoveCommand),

    /// Show or change launcher settings
    Config(ConfigCommand),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::List(cmd) => cmd.run(self.global_args).await,
            Commands::Install(cmd) => cmd.run(self.global_args).await,
            Commands::Launch(cmd) => cmd.run(self.global_args).await,
            Commands::Register(cmd) => cmd.run(self.global_args).await,
            Commands::Remove(cmd) => cmd.run(self.global_args).await,
            Commands::Edit(cmd) => cmd.run(self.global_args).await,
            Commands::MoveCmd(cmd) => cmd.run(self.global_args).await,
            Commands::Config(cmd) => cmd.run(self.global_args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::Cli;
    use clap::CommandFactory;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }
}
