use crate::error::{LauncherError, LauncherResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Base URL of the version catalog service.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

/// A single game version as returned by `GET /versions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameVersion {
    pub name: String,

    /// When true, only shown if the user enables "show hidden versions".
    pub hidden: bool,

    pub released_at: DateTime<Utc>,

    /// Numeric sort key provided by the API. Higher value means newer.
    pub version_order: i64,
}

/// Download metadata as returned by `GET /download/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionDownload {
    /// Direct link to the installer artifact.
    pub url: String,

    /// Suggested save name.
    pub filename: String,

    /// Size in bytes as declared by the catalog.
    pub size: u64,

    /// Content hash as "algorithm:hexdigest" (e.g. "sha256:ab12...").
    /// Empty means the artifact is accepted unverified.
    pub checksum: String,
}

/// Invoked after every received chunk with (bytes_downloaded, total_bytes).
/// `total_bytes` is the server-declared content length, 0 when unknown.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(u64, u64) + Send);

/// Boundary to the remote catalog service.
///
/// The metadata calls return `None` for "unreachable or error" as well as
/// "no data": the two are intentionally indistinguishable, and callers must
/// treat both as a single retryable failure class.
pub trait CatalogClient {
    fn versions(&self) -> impl Future<Output = Option<Vec<GameVersion>>> + Send;

    fn version_download(
        &self,
        version_name: &str,
    ) -> impl Future<Output = Option<VersionDownload>> + Send;

    /// Streams the artifact into memory, reporting progress per chunk.
    fn download_artifact(
        &self,
        download: &VersionDownload,
        on_progress: ProgressFn<'_>,
    ) -> impl Future<Output = LauncherResult<Vec<u8>>> + Send;
}

pub struct HttpCatalogClient {
    base_url: String,
    client: Client,
}

impl HttpCatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent("kamr/0.1.0")
            .build()
            .expect("Failed to create HTTP client");
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Any failed request logs a warning and returns `None` instead of
    /// propagating, so callers can treat a missing connection the same as
    /// any other "no data" state.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        match self.try_get_json(path).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!("API GET failed: {path}: {e:#}");
                None
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("server returned HTTP {}", response.status());
        }

        Ok(response.json().await?)
    }
}

impl CatalogClient for HttpCatalogClient {
    async fn versions(&self) -> Option<Vec<GameVersion>> {
        self.get_json("/versions").await
    }

    async fn version_download(&self, version_name: &str) -> Option<VersionDownload> {
        self.get_json(&format!("/download/{version_name}")).await
    }

    async fn download_artifact(
        &self,
        download: &VersionDownload,
        on_progress: ProgressFn<'_>,
    ) -> LauncherResult<Vec<u8>> {
        let response = self
            .client
            .get(&download.url)
            .send()
            .await
            .map_err(|e| LauncherError::DownloadFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadRejected {
                status: status.as_u16(),
            });
        }

        let total_bytes = response.content_length().unwrap_or(0);
        let mut data = Vec::new();
        let mut stream = response.bytes_stream();

        use futures_util::StreamExt;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| LauncherError::DownloadInterrupted {
                reason: e.to_string(),
            })?;
            data.extend_from_slice(&chunk);
            on_progress(data.len() as u64, total_bytes);
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_version_parses_api_shape() -> anyhow::Result<()> {
        let version: GameVersion = serde_json::from_str(
            r#"{
                "name": "r12345",
                "hidden": false,
                "releasedAt": "2024-01-15T10:00:00Z",
                "versionOrder": 12345
            }"#,
        )?;

        assert_eq!(version.name, "r12345");
        assert!(!version.hidden);
        assert_eq!(version.version_order, 12345);
        Ok(())
    }

    #[test]
    fn test_version_download_parses_api_shape() -> anyhow::Result<()> {
        let download: VersionDownload = serde_json::from_str(
            r#"{
                "url": "https://example.com/KaM_Remake_r12345.exe",
                "filename": "KaM_Remake_r12345.exe",
                "size": 123456789,
                "checksum": "sha256:abcdef0123"
            }"#,
        )?;

        assert_eq!(download.filename, "KaM_Remake_r12345.exe");
        assert_eq!(download.size, 123456789);
        assert_eq!(download.checksum, "sha256:abcdef0123");
        Ok(())
    }
}
