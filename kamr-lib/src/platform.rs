use crate::error::{LauncherError, LauncherResult};
use std::path::Path;

/// Placeholder in a launch template, replaced with the executable basename.
pub const EXECUTABLE_PLACEHOLDER: &str = "%exe%";

/// Abstracts "run installer" and "spawn executable" for the host platform.
pub trait PlatformAdapter {
    /// True when the host can run the installer unattended. The pipeline
    /// falls back to a manual install everywhere else.
    fn supports_automated_install(&self) -> bool;

    /// Runs the installer synchronously against the target directory.
    /// Only invoked when [`Self::supports_automated_install`] is true.
    fn run_installer(
        &self,
        installer_path: &Path,
        install_dir: &Path,
    ) -> impl Future<Output = LauncherResult<()>> + Send;

    /// Spawns the game and detaches. An empty template launches the
    /// executable directly; otherwise the rendered template is handed to
    /// the platform shell. The executable's folder is the working
    /// directory either way.
    fn launch(&self, executable_path: &Path, launch_args: &str) -> LauncherResult<()>;
}

/// Renders a launch template by substituting the executable basename.
pub fn render_launch_command(template: &str, executable_path: &Path) -> String {
    let exe_name = executable_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    template.replace(EXECUTABLE_PLACEHOLDER, &exe_name)
}

pub struct NativePlatform;

impl PlatformAdapter for NativePlatform {
    fn supports_automated_install(&self) -> bool {
        cfg!(windows)
    }

    async fn run_installer(&self, installer_path: &Path, install_dir: &Path) -> LauncherResult<()> {
        // Inno Setup silent install flags.
        let command_line = format!(
            "\"{}\" /VERYSILENT /SUPPRESSMSGBOXES /NORESTART /DIR=\"{}\" /NOICONS",
            installer_path.display(),
            install_dir.display()
        );

        let output = tokio::process::Command::new("cmd")
            .args(["/C", command_line.as_str()])
            .output()
            .await
            .map_err(|e| LauncherError::InstallerSpawn {
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(LauncherError::InstallerExited {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn launch(&self, executable_path: &Path, launch_args: &str) -> LauncherResult<()> {
        let folder = executable_path.parent().unwrap_or(executable_path);

        let mut command = if launch_args.trim().is_empty() {
            let mut command = std::process::Command::new(executable_path);
            command.current_dir(folder);
            command
        } else {
            let command_line = render_launch_command(launch_args, executable_path);
            let (shell, flag) = if cfg!(windows) {
                ("cmd", "/C")
            } else {
                ("sh", "-c")
            };
            let mut command = std::process::Command::new(shell);
            command.args([flag, command_line.as_str()]).current_dir(folder);
            command
        };

        command.spawn().map_err(|e| LauncherError::LaunchFailed {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_launch_command_substitutes_basename() {
        let rendered = render_launch_command(
            "wine %exe%",
            Path::new("/games/KaM_r10745/KaM_Remake.exe"),
        );
        assert_eq!(rendered, "wine KaM_Remake.exe");
    }

    #[test]
    fn test_render_launch_command_without_placeholder() {
        let rendered =
            render_launch_command("gamemoderun ./start.sh", Path::new("/games/KaM_Remake.exe"));
        assert_eq!(rendered, "gamemoderun ./start.sh");
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_runs_template_through_shell() -> anyhow::Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let marker = tmp_dir.path().join("launched.txt");
        let executable = tmp_dir.path().join("KaM_Remake.exe");
        std::fs::write(&executable, b"")?;

        let template = format!("echo %exe% > \"{}\"", marker.display());
        NativePlatform.launch(&executable, &template)?;

        // The child runs detached; give it a moment to write the marker.
        for _ in 0..50 {
            if marker.exists() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        let contents = std::fs::read_to_string(&marker)?;
        assert_eq!(contents.trim(), "KaM_Remake.exe");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_missing_executable_fails() {
        let result = NativePlatform.launch(Path::new("/no/such/KaM_Remake.exe"), "");
        assert!(matches!(result, Err(LauncherError::LaunchFailed { .. })));
    }
}
