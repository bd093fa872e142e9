use crate::catalog::CatalogClient;
use crate::error::{LauncherError, LauncherResult};
use crate::game::GAME_EXECUTABLE;
use crate::paths::AppPaths;
use crate::platform::PlatformAdapter;
use crate::registry::{InstallationRegistry, InstalledVersion};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    Downloading,
    Verifying,
    Writing,
    Installing,
}

/// Emitted after every received chunk while downloading, and once when each
/// later stage begins. Callbacks run synchronously on the pipeline's task
/// and must not block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    pub stage: ProgressStage,
    pub bytes_downloaded: u64,
    pub total_bytes: u64,
    pub percent_complete: u32,
}

/// Result of a successful pipeline run.
///
/// `manual_install_path` is `None` after a full automatic install, or the
/// path of the downloaded installer when the platform cannot run it
/// unattended and the user has to install manually. Both are success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub manual_install_path: Option<PathBuf>,
}

pub type ProgressCallback<'a> = &'a mut (dyn FnMut(DownloadProgress) + Send);

/// Downloads a game version installer, verifies its checksum, and installs it.
///
/// Where automated install is supported: downloads, verifies, runs the
/// installer, records the result in the registry, and cleans up the
/// artifact. Elsewhere: downloads, verifies, and returns the artifact path
/// for manual installation.
pub async fn install_version<C, P>(
    paths: &AppPaths,
    catalog: &C,
    registry: &InstallationRegistry,
    platform: &P,
    version_name: &str,
    install_path: &Path,
    name: &str,
    on_progress: ProgressCallback<'_>,
) -> LauncherResult<InstallOutcome>
where
    C: CatalogClient,
    P: PlatformAdapter,
{
    // 1. Resolve download metadata
    let download = catalog.version_download(version_name).await.ok_or_else(|| {
        LauncherError::CatalogUnavailable {
            version: version_name.to_string(),
        }
    })?;

    // 2. Stream the artifact, reporting progress per chunk
    let mut report_download = |bytes_downloaded: u64, total_bytes: u64| {
        on_progress(DownloadProgress {
            stage: ProgressStage::Downloading,
            bytes_downloaded,
            total_bytes,
            percent_complete: percent(bytes_downloaded, total_bytes),
        });
    };
    let data = catalog
        .download_artifact(&download, &mut report_download)
        .await?;

    // 3. Verify against the declared content hash, if any
    on_progress(stage_marker(ProgressStage::Verifying));
    tokio::task::yield_now().await;

    if !download.checksum.is_empty() {
        verify_checksum(&data, &download.checksum)?;
    }

    // 4. Persist the artifact; a repeated attempt overwrites the previous one
    let installer_path = paths.data_dir.join(installer_filename(version_name));

    on_progress(stage_marker(ProgressStage::Writing));
    tokio::task::yield_now().await;

    tokio::fs::write(&installer_path, &data)
        .await
        .map_err(|e| LauncherError::Io {
            path: installer_path.clone(),
            source: e,
        })?;

    // 5. Hand off to the user where automated install is unsupported
    if !platform.supports_automated_install() {
        return Ok(InstallOutcome {
            manual_install_path: Some(installer_path),
        });
    }

    // 6. Run the installer, register the result, clean up
    on_progress(stage_marker(ProgressStage::Installing));
    tokio::task::yield_now().await;

    platform.run_installer(&installer_path, install_path).await?;

    if let Err(e) = tokio::fs::remove_file(&installer_path).await {
        tracing::debug!(
            "Could not remove installer {}: {e}",
            installer_path.display()
        );
    }

    registry.add_installed_version(InstalledVersion {
        name: name.to_string(),
        version: version_name.to_string(),
        executable_path: install_path
            .join(GAME_EXECUTABLE)
            .to_string_lossy()
            .into_owned(),
        installed_at: Utc::now(),
        // The registry assigns the real order on insert.
        order: 0,
        launch_args: String::new(),
    });

    Ok(InstallOutcome {
        manual_install_path: None,
    })
}

/// Deterministic artifact name so repeated attempts overwrite rather than
/// accumulate.
pub fn installer_filename(version_name: &str) -> String {
    format!("KaM_Remake_install_{version_name}.exe")
}

fn stage_marker(stage: ProgressStage) -> DownloadProgress {
    DownloadProgress {
        stage,
        bytes_downloaded: 0,
        total_bytes: 0,
        percent_complete: 0,
    }
}

/// Rounded integer percentage; 0 while the total is unknown.
fn percent(bytes_downloaded: u64, total_bytes: u64) -> u32 {
    if total_bytes == 0 {
        return 0;
    }
    ((bytes_downloaded * 100 + total_bytes / 2) / total_bytes) as u32
}

/// The declared checksum is "algorithm:hexdigest"; a bare digest is treated
/// as SHA-256. Comparison is case-insensitive on the hex digest.
fn verify_checksum(data: &[u8], declared: &str) -> LauncherResult<()> {
    let (algorithm, expected) = match declared.split_once(':') {
        Some((algorithm, digest)) => (algorithm, digest),
        None => ("sha256", declared),
    };

    if !algorithm.eq_ignore_ascii_case("sha256") {
        return Err(LauncherError::UnsupportedChecksum {
            algorithm: algorithm.to_string(),
        });
    }

    let actual = hex::encode(Sha256::digest(data));
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(LauncherError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }

    Ok(())
}
