use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the install pipeline and the platform adapter.
///
/// Store read/write failures never reach this type: the stores recover to
/// defaults (reads) or keep the in-memory state (writes) and report through
/// `tracing::warn!` instead.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("could not retrieve download info for {version}, check your internet connection")]
    CatalogUnavailable { version: String },

    #[error("download failed: server returned HTTP {status}")]
    DownloadRejected { status: u16 },

    #[error("download failed: {reason}")]
    DownloadFailed { reason: String },

    #[error("download interrupted: {reason}")]
    DownloadInterrupted { reason: String },

    #[error("checksum verification failed: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("unsupported checksum algorithm: {algorithm}")]
    UnsupportedChecksum { algorithm: String },

    #[error("failed to write installer to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("installer exited with code {code}: {stderr}")]
    InstallerExited { code: i32, stderr: String },

    #[error("failed to run installer: {reason}")]
    InstallerSpawn { reason: String },

    #[error("failed to launch game: {reason}")]
    LaunchFailed { reason: String },
}

pub type LauncherResult<T> = Result<T, LauncherError>;
