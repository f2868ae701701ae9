// ─── Version Manifest ───
// Fetches, caches and queries the Mojang version manifest v2.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::downloader::store::write_bytes;
use crate::core::downloader::{ContentStore, ExpectedHash, HashAlgorithm};
use crate::core::error::{CoreError, CoreResult};
use crate::core::version::sidecar::HashSidecar;

pub const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";
pub const MANIFEST_FILE: &str = "version_manifest_v2.json";

/// Top-level Mojang version manifest. Entries are ordered newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionManifest {
    #[serde(default)]
    pub latest: Option<LatestVersions>,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    #[serde(rename = "releaseTime")]
    pub release_time: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl VersionEntry {
    pub fn is_release(&self) -> bool {
        self.version_type == "release"
    }

    pub fn released_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.release_time).ok()
    }
}

impl VersionManifest {
    /// Find a specific version entry by ID (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Position of `id` counted from the newest entry.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.versions.iter().position(|v| v.id == id)
    }

    /// Chronological index of `id`: 0 for the oldest entry.
    pub fn chronological_index(&self, id: &str) -> Option<usize> {
        self.position(id).map(|pos| self.versions.len() - 1 - pos)
    }

    /// Whether `id` was released at or after `pivot`. `None` when either id
    /// is unknown.
    pub fn is_at_or_after(&self, id: &str, pivot: &str) -> Option<bool> {
        let target = self.find_version(id)?;
        let pivot = self.find_version(pivot)?;
        match (target.released_at(), pivot.released_at()) {
            (Some(t), Some(p)) => Some(t >= p),
            _ => Some(self.position(&target.id)? <= self.position(&pivot.id)?),
        }
    }

    /// Reorder `ids` to manifest order (newest first). Ids the manifest
    /// does not know keep their input order after the known ones.
    pub fn order_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<String> {
        let mut known: Vec<(usize, String)> = Vec::new();
        let mut unknown: Vec<String> = Vec::new();
        for id in ids {
            let id = id.as_ref();
            match self.position(id) {
                Some(pos) => known.push((pos, id.to_string())),
                None => unknown.push(id.to_string()),
            }
        }
        known.sort_by_key(|(pos, _)| *pos);
        known.into_iter().map(|(_, id)| id).chain(unknown).collect()
    }
}

// ─── Resolver ───

/// Retrieves the manifest, caching it under `<cache>/version_manifest_v2.json`.
#[derive(Clone)]
pub struct ManifestResolver {
    store: ContentStore,
    cache_dir: PathBuf,
}

impl ManifestResolver {
    pub fn new(store: ContentStore, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            cache_dir: cache_dir.into(),
        }
    }

    fn manifest_path(&self) -> PathBuf {
        self.cache_dir.join(MANIFEST_FILE)
    }

    /// The ordered vanilla build list.
    ///
    /// With `use_cache` a verified local copy is returned without touching
    /// the network. Otherwise the remote copy wins and the local one is only
    /// a fallback, accepted when its sha1 matches the sidecar.
    pub async fn get_manifest(&self, use_cache: bool) -> CoreResult<VersionManifest> {
        let local = self.read_verified_local().await;

        if use_cache {
            if let Some(manifest) = local.as_deref().and_then(parse_quietly) {
                debug!("Using cached version manifest");
                return Ok(manifest);
            }
        }

        info!("Fetching Minecraft version manifest...");
        let remote = async {
            let bytes = self.store.fetch(VERSION_MANIFEST_URL).await?;
            let manifest: VersionManifest = serde_json::from_slice(&bytes)?;
            Ok::<_, CoreError>((bytes, manifest))
        }
        .await;

        match remote {
            Ok((bytes, manifest)) => {
                write_bytes(&self.manifest_path(), &bytes).await?;
                HashSidecar::record_manifest(&self.cache_dir, HashAlgorithm::Sha1.digest_hex(&bytes))
                    .await?;
                info!("Loaded {} versions from manifest", manifest.versions.len());
                Ok(manifest)
            }
            Err(e) => match local.as_deref().and_then(parse_quietly) {
                Some(manifest) => {
                    warn!("Manifest fetch failed, using cached copy: {}", e);
                    Ok(manifest)
                }
                None => Err(e),
            },
        }
    }

    /// The manifest record for `id`.
    pub async fn find_version(&self, id: &str, use_cache: bool) -> CoreResult<VersionEntry> {
        let manifest = self.get_manifest(use_cache).await?;
        manifest
            .find_version(id)
            .cloned()
            .ok_or_else(|| CoreError::NotInManifest(id.to_string()))
    }

    async fn read_verified_local(&self) -> Option<Vec<u8>> {
        let expected = HashSidecar::load(&self.cache_dir).await.manifest_sha1?;
        read_matching(&self.manifest_path(), &ExpectedHash::sha1(expected)).await
    }
}

async fn read_matching(path: &Path, expected: &ExpectedHash) -> Option<Vec<u8>> {
    let bytes = tokio::fs::read(path).await.ok()?;
    if expected.mismatch(&bytes).is_some() {
        warn!("Cached {:?} does not match its recorded hash", path);
        return None;
    }
    Some(bytes)
}

fn parse_quietly(bytes: &[u8]) -> Option<VersionManifest> {
    serde_json::from_slice(bytes).ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::testing::{manifest_json, scratch_dir, MapFetcher};

    #[test]
    fn deserialize_manifest_entry() {
        let json = r#"{
            "id": "1.20.4",
            "type": "release",
            "releaseTime": "2023-12-07T08:00:00+00:00",
            "url": "https://example.com/1.20.4.json",
            "sha1": "abc123"
        }"#;
        let entry: VersionEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "1.20.4");
        assert!(entry.is_release());
        assert!(entry.released_at().is_some());
    }

    #[test]
    fn order_ids_puts_unknown_ids_last_in_input_order() {
        let manifest: VersionManifest = serde_json::from_slice(&manifest_json()).unwrap();
        let ordered = manifest.order_ids(&["1.9", "zzz", "1.21", "aaa", "1.16"]);
        assert_eq!(ordered, vec!["1.21", "1.16", "1.9", "zzz", "aaa"]);
    }

    #[test]
    fn chronology_follows_release_time() {
        let manifest: VersionManifest = serde_json::from_slice(&manifest_json()).unwrap();
        assert_eq!(manifest.is_at_or_after("1.18.1", "1.18.1"), Some(true));
        assert_eq!(manifest.is_at_or_after("1.17", "1.18.1"), Some(false));
        assert_eq!(manifest.is_at_or_after("nope", "1.17"), None);
        assert!(manifest.chronological_index("1.21") > manifest.chronological_index("1.3"));
    }

    #[tokio::test]
    async fn remote_success_records_sidecar_and_serves_cache() {
        let dir = scratch_dir("manifest-remote");
        let fetcher = Arc::new(MapFetcher::new().with(VERSION_MANIFEST_URL, manifest_json()));
        let resolver = ManifestResolver::new(ContentStore::new(fetcher.clone()), &dir);

        resolver.get_manifest(false).await.unwrap();
        let cached = resolver.get_manifest(true).await.unwrap();

        assert_eq!(fetcher.hits(VERSION_MANIFEST_URL), 1);
        assert_eq!(cached.versions[0].id, "1.21");
        assert!(HashSidecar::load(&dir).await.manifest_sha1.is_some());
    }

    #[tokio::test]
    async fn remote_failure_uses_only_verified_local_copy() {
        let dir = scratch_dir("manifest-fallback");
        let good = ManifestResolver::new(
            ContentStore::new(Arc::new(MapFetcher::new().with(VERSION_MANIFEST_URL, manifest_json()))),
            &dir,
        );
        good.get_manifest(false).await.unwrap();

        let offline = ManifestResolver::new(
            ContentStore::new(Arc::new(MapFetcher::new().failing(VERSION_MANIFEST_URL, 500))),
            &dir,
        );
        assert!(offline.get_manifest(false).await.is_ok());

        std::fs::write(dir.join(MANIFEST_FILE), br#"{"versions":[]}"#).unwrap();
        let err = offline.get_manifest(false).await.unwrap_err();
        assert!(matches!(err, CoreError::DownloadFailed { status: 500, .. }));
    }
}
