use crate::catalog::{CatalogClient, GameVersion, ProgressFn, VersionDownload};
use crate::error::LauncherResult;
use chrono::Utc;
use sha2::{Digest, Sha256};

/// Catalog double serving a fixed artifact, with controllable chunking and
/// declared size. `unreachable()` simulates a dead catalog service.
pub struct MockCatalogClient {
    versions: Option<Vec<GameVersion>>,
    download: Option<VersionDownload>,
    artifact: Vec<u8>,
    chunk_sizes: Vec<usize>,
    declared_total: u64,
}

impl MockCatalogClient {
    /// A reachable catalog offering `artifact` for every version, with a
    /// correct SHA-256 checksum and the artifact length as declared size.
    pub fn for_artifact(artifact: Vec<u8>) -> Self {
        let checksum = format!("sha256:{}", hex::encode(Sha256::digest(&artifact)));
        let declared_total = artifact.len() as u64;
        Self {
            versions: Some(vec![GameVersion {
                name: "r10745".to_string(),
                hidden: false,
                released_at: Utc::now(),
                version_order: 10745,
            }]),
            download: Some(VersionDownload {
                url: "https://example.com/KaM_Remake_r10745.exe".to_string(),
                filename: "KaM_Remake_r10745.exe".to_string(),
                size: declared_total,
                checksum,
            }),
            artifact,
            chunk_sizes: Vec::new(),
            declared_total,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            versions: None,
            download: None,
            artifact: Vec::new(),
            chunk_sizes: Vec::new(),
            declared_total: 0,
        }
    }

    pub fn with_checksum(mut self, checksum: &str) -> Self {
        if let Some(download) = &mut self.download {
            download.checksum = checksum.to_string();
        }
        self
    }

    pub fn with_chunks(mut self, chunk_sizes: Vec<usize>) -> Self {
        self.chunk_sizes = chunk_sizes;
        self
    }

    /// Overrides the server-declared content length (0 = unknown).
    pub fn with_declared_total(mut self, declared_total: u64) -> Self {
        self.declared_total = declared_total;
        self
    }
}

impl CatalogClient for MockCatalogClient {
    async fn versions(&self) -> Option<Vec<GameVersion>> {
        self.versions.clone()
    }

    async fn version_download(&self, _version_name: &str) -> Option<VersionDownload> {
        self.download.clone()
    }

    async fn download_artifact(
        &self,
        _download: &VersionDownload,
        on_progress: ProgressFn<'_>,
    ) -> LauncherResult<Vec<u8>> {
        let chunk_sizes = if self.chunk_sizes.is_empty() {
            vec![self.artifact.len()]
        } else {
            self.chunk_sizes.clone()
        };

        let mut sent = 0usize;
        for size in chunk_sizes {
            sent = (sent + size).min(self.artifact.len());
            on_progress(sent as u64, self.declared_total);
        }

        Ok(self.artifact.clone())
    }
}
