// ─── Hash Sidecar ───
// `<cache>/config.json`: sha1 of the cached manifest and of every cached
// `all.json`, written together with the file they describe.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::downloader::store::write_bytes;
use crate::core::error::CoreResult;
use crate::core::version::model::Distribution;

pub const SIDECAR_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashSidecar {
    #[serde(default)]
    pub manifest_sha1: Option<String>,
    #[serde(default)]
    pub versions_sha1: BTreeMap<Distribution, String>,
}

impl HashSidecar {
    pub fn path(cache_dir: &Path) -> PathBuf {
        cache_dir.join(SIDECAR_FILE)
    }

    /// Read the sidecar. Missing or unreadable files yield an empty one,
    /// which makes every cached file unverifiable.
    pub async fn load(cache_dir: &Path) -> Self {
        let path = Self::path(cache_dir);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring malformed hash sidecar {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub async fn save(&self, cache_dir: &Path) -> CoreResult<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        write_bytes(&Self::path(cache_dir), &bytes).await
    }

    /// Record the manifest hash, preserving the other entries on disk.
    pub async fn record_manifest(cache_dir: &Path, sha1: String) -> CoreResult<()> {
        let mut sidecar = Self::load(cache_dir).await;
        sidecar.manifest_sha1 = Some(sha1);
        sidecar.save(cache_dir).await
    }

    /// Record the `all.json` hash of one distribution.
    pub async fn record_versions(
        cache_dir: &Path,
        distribution: Distribution,
        sha1: String,
    ) -> CoreResult<()> {
        let mut sidecar = Self::load(cache_dir).await;
        sidecar.versions_sha1.insert(distribution, sha1);
        sidecar.save(cache_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::scratch_dir;

    #[tokio::test]
    async fn records_merge_into_one_file() {
        let dir = scratch_dir("sidecar-merge");

        HashSidecar::record_manifest(&dir, "aaa".into()).await.unwrap();
        HashSidecar::record_versions(&dir, Distribution::Forge, "bbb".into())
            .await
            .unwrap();

        let sidecar = HashSidecar::load(&dir).await;
        assert_eq!(sidecar.manifest_sha1.as_deref(), Some("aaa"));
        assert_eq!(
            sidecar.versions_sha1.get(&Distribution::Forge).map(String::as_str),
            Some("bbb")
        );

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.join(SIDECAR_FILE)).unwrap()).unwrap();
        assert_eq!(raw["versionsSha1"]["forge"], "bbb");
    }

    #[tokio::test]
    async fn malformed_sidecar_reads_as_empty() {
        let dir = scratch_dir("sidecar-malformed");
        std::fs::write(dir.join(SIDECAR_FILE), b"{not json").unwrap();
        assert_eq!(HashSidecar::load(&dir).await, HashSidecar::default());
    }
}
