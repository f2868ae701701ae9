use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::core::downloader::client::Fetcher;
use crate::core::downloader::hash::ExpectedHash;
use crate::core::error::{CoreError, CoreResult};

/// Which side `fetch_or_cache` tries first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Use the local file when present and valid, otherwise download.
    PreferLocal,
    /// Download, falling back to a valid local file on failure.
    PreferRemote,
}

/// Hash-verified fetch-or-cache primitive shared by every module.
#[derive(Clone)]
pub struct ContentStore {
    fetcher: Arc<dyn Fetcher>,
}

impl ContentStore {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    // ── Remote only ─────────────────────────────────────

    pub async fn fetch(&self, url: &str) -> CoreResult<Vec<u8>> {
        self.fetcher.get(url).await
    }

    pub async fn fetch_text(&self, url: &str) -> CoreResult<String> {
        let bytes = self.fetch(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> CoreResult<T> {
        let bytes = self.fetch(url).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Download `url`, rejecting the body when it fails `hash`.
    pub async fn fetch_verified(
        &self,
        url: &str,
        hash: Option<&ExpectedHash>,
    ) -> CoreResult<Vec<u8>> {
        let bytes = self.fetch(url).await?;
        if let Some(expected) = hash {
            if let Some(actual) = expected.mismatch(&bytes) {
                return Err(CoreError::HashMismatch {
                    url: url.to_string(),
                    algorithm: expected.algorithm.name(),
                    expected: expected.value.clone(),
                    actual,
                });
            }
        }
        Ok(bytes)
    }

    // ── Local + remote ──────────────────────────────────

    /// Return the bytes of `path`, downloading them from `url` when needed.
    ///
    /// A local file that fails `hash` counts as absent. Freshly downloaded
    /// bytes are written only after they pass `hash`.
    pub async fn fetch_or_cache(
        &self,
        path: &Path,
        url: &str,
        hash: Option<&ExpectedHash>,
        direction: Direction,
    ) -> CoreResult<Vec<u8>> {
        match direction {
            Direction::PreferLocal => {
                if let Some(bytes) = read_valid(path, hash).await {
                    debug!("Cache hit: {:?}", path);
                    return Ok(bytes);
                }
                let bytes = self.fetch_verified(url, hash).await?;
                write_bytes(path, &bytes).await?;
                Ok(bytes)
            }
            Direction::PreferRemote => match self.fetch_verified(url, hash).await {
                Ok(bytes) => {
                    write_bytes(path, &bytes).await?;
                    Ok(bytes)
                }
                Err(e) => match read_valid(path, hash).await {
                    Some(bytes) => {
                        warn!("Using cached {:?} after remote failure: {}", path, e);
                        Ok(bytes)
                    }
                    None => Err(e),
                },
            },
        }
    }

    /// Ensure `path` holds the resource at `url`, without returning its bytes.
    pub async fn download_to(
        &self,
        path: &Path,
        url: &str,
        hash: Option<&ExpectedHash>,
    ) -> CoreResult<()> {
        self.fetch_or_cache(path, url, hash, Direction::PreferLocal)
            .await
            .map(|_| ())
    }
}

async fn read_valid(path: &Path, hash: Option<&ExpectedHash>) -> Option<Vec<u8>> {
    let bytes = tokio::fs::read(path).await.ok()?;
    match hash {
        Some(expected) if expected.mismatch(&bytes).is_some() => {
            debug!("Cached {:?} failed {} check", path, expected.algorithm.name());
            None
        }
        _ => Some(bytes),
    }
}

/// Write `bytes` to `path`, creating parent directories.
///
/// The bytes land in `<path>.tmp` first and are renamed over `path`, so a
/// reader never sees a partial file.
pub(crate) async fn write_bytes(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CoreError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    // Handle dropped before the rename, Windows refuses to move open files
    {
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| CoreError::io(&tmp, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| CoreError::io(&tmp, e))?;
        file.flush().await.map_err(|e| CoreError::io(&tmp, e))?;
    }
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| CoreError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::hash::HashAlgorithm;
    use crate::core::testing::{scratch_dir, MapFetcher};

    const URL: &str = "https://example.com/server.jar";

    #[tokio::test]
    async fn prefer_local_downloads_once_then_hits_cache() {
        let dir = scratch_dir("store-prefer-local");
        let fetcher = Arc::new(MapFetcher::new().with(URL, b"jar-bytes".to_vec()));
        let store = ContentStore::new(fetcher.clone());
        let path = dir.join("nested").join("server.jar");
        let hash = ExpectedHash::new(HashAlgorithm::Sha1, HashAlgorithm::Sha1.digest_hex(b"jar-bytes"));

        let first = store
            .fetch_or_cache(&path, URL, Some(&hash), Direction::PreferLocal)
            .await
            .unwrap();
        let second = store
            .fetch_or_cache(&path, URL, Some(&hash), Direction::PreferLocal)
            .await
            .unwrap();

        assert_eq!(first, b"jar-bytes");
        assert_eq!(second, b"jar-bytes");
        assert_eq!(fetcher.hits(URL), 1);
    }

    #[tokio::test]
    async fn corrupt_local_file_is_treated_as_absent() {
        let dir = scratch_dir("store-corrupt-local");
        let path = dir.join("server.jar");
        std::fs::write(&path, b"truncated").unwrap();

        let fetcher = Arc::new(MapFetcher::new().with(URL, b"good".to_vec()));
        let store = ContentStore::new(fetcher.clone());
        let hash = ExpectedHash::new(HashAlgorithm::Sha256, HashAlgorithm::Sha256.digest_hex(b"good"));

        let bytes = store
            .fetch_or_cache(&path, URL, Some(&hash), Direction::PreferLocal)
            .await
            .unwrap();

        assert_eq!(bytes, b"good");
        assert_eq!(std::fs::read(&path).unwrap(), b"good");
        assert_eq!(fetcher.hits(URL), 1);
    }

    #[tokio::test]
    async fn fresh_mismatch_is_an_error_and_never_cached() {
        let dir = scratch_dir("store-fresh-mismatch");
        let path = dir.join("server.jar");
        let store = ContentStore::new(Arc::new(MapFetcher::new().with(URL, b"evil".to_vec())));
        let hash = ExpectedHash::new(HashAlgorithm::Md5, HashAlgorithm::Md5.digest_hex(b"good"));

        let err = store
            .fetch_or_cache(&path, URL, Some(&hash), Direction::PreferLocal)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::HashMismatch { algorithm: "md5", .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn prefer_remote_falls_back_to_valid_local_copy() {
        let dir = scratch_dir("store-prefer-remote");
        let path = dir.join("list.json");
        std::fs::write(&path, b"[]").unwrap();

        let store = ContentStore::new(Arc::new(MapFetcher::new().failing(URL, 503)));
        let bytes = store
            .fetch_or_cache(&path, URL, None, Direction::PreferRemote)
            .await
            .unwrap();
        assert_eq!(bytes, b"[]");

        std::fs::remove_file(&path).unwrap();
        let err = store
            .fetch_or_cache(&path, URL, None, Direction::PreferRemote)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DownloadFailed { status: 503, .. }));
    }

    #[tokio::test]
    async fn write_replaces_file_without_leaving_temp() {
        let dir = scratch_dir("store-write-bytes");
        let path = dir.join("deep").join("version.json");

        write_bytes(&path, b"first").await.unwrap();
        write_bytes(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(!dir.join("deep").join("version.json.tmp").exists());
        assert_eq!(std::fs::read_dir(dir.join("deep")).unwrap().count(), 1);
    }
}
