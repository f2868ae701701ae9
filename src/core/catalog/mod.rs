// ─── Version Catalogs ───
// One discovery contract, six implementations, and the `all.json` cache
// every catalog shares.

pub mod fabric;
pub mod forge;
pub mod mohistmc;
pub mod papermc;
pub mod spigot;
pub mod vanilla;

use std::fmt::Display;
use std::future::Future;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::core::downloader::store::write_bytes;
use crate::core::downloader::{ContentStore, ExpectedHash, HashAlgorithm};
use crate::core::error::CoreResult;
use crate::core::version::{Distribution, HashSidecar, ManifestResolver, VersionList};

pub use fabric::FabricCatalog;
pub use forge::ForgeCatalog;
pub use mohistmc::MohistmcCatalog;
pub use papermc::PapermcCatalog;
pub use spigot::SpigotCatalog;
pub use vanilla::VanillaCatalog;

const ALL_VERSIONS_FILE: &str = "all.json";

/// Everything a catalog needs to query its upstream.
pub struct CatalogContext<'a> {
    pub store: &'a ContentStore,
    pub manifest: &'a ManifestResolver,
    pub cache_dir: &'a Path,
    /// Maximum in-flight per-id lookups.
    pub fan_out: usize,
    /// Whether the manifest may come from cache.
    pub use_cache: bool,
}

#[async_trait]
pub trait VersionCatalog: Send + Sync {
    fn distribution(&self) -> Distribution;

    /// Query the upstream for the full version list.
    async fn get_from_url(&self, ctx: &CatalogContext<'_>) -> CoreResult<VersionList>;
}

/// Dispatcher over the six catalogs.
pub enum Catalog {
    Vanilla(VanillaCatalog),
    Spigot(SpigotCatalog),
    Papermc(PapermcCatalog),
    Forge(ForgeCatalog),
    Mohistmc(MohistmcCatalog),
    Fabric(FabricCatalog),
}

impl Catalog {
    pub fn new(distribution: Distribution) -> Self {
        match distribution {
            Distribution::Vanilla => Self::Vanilla(VanillaCatalog),
            Distribution::Spigot => Self::Spigot(SpigotCatalog),
            Distribution::Papermc => Self::Papermc(PapermcCatalog),
            Distribution::Forge => Self::Forge(ForgeCatalog),
            Distribution::Mohistmc => Self::Mohistmc(MohistmcCatalog),
            Distribution::Fabric => Self::Fabric(FabricCatalog),
        }
    }

    pub fn distribution(&self) -> Distribution {
        match self {
            Catalog::Vanilla(c) => c.distribution(),
            Catalog::Spigot(c) => c.distribution(),
            Catalog::Papermc(c) => c.distribution(),
            Catalog::Forge(c) => c.distribution(),
            Catalog::Mohistmc(c) => c.distribution(),
            Catalog::Fabric(c) => c.distribution(),
        }
    }

    pub async fn get_from_url(&self, ctx: &CatalogContext<'_>) -> CoreResult<VersionList> {
        match self {
            Catalog::Vanilla(c) => c.get_from_url(ctx).await,
            Catalog::Spigot(c) => c.get_from_url(ctx).await,
            Catalog::Papermc(c) => c.get_from_url(ctx).await,
            Catalog::Forge(c) => c.get_from_url(ctx).await,
            Catalog::Mohistmc(c) => c.get_from_url(ctx).await,
            Catalog::Fabric(c) => c.get_from_url(ctx).await,
        }
    }

    /// The version list, from a verified cache when `use_cache` is set.
    ///
    /// A failed remote query is returned as is; a stale cache is never
    /// served in its place.
    pub async fn list(&self, ctx: &CatalogContext<'_>) -> CoreResult<VersionList> {
        let distribution = self.distribution();

        if ctx.use_cache {
            if let Some(list) = get_from_cache(ctx.cache_dir, distribution).await {
                debug!("Using cached {} version list", distribution);
                return Ok(list);
            }
        }

        info!("Fetching {} version list...", distribution);
        let list = self.get_from_url(ctx).await?;
        write_cache(ctx.cache_dir, &list).await?;
        info!("Cached {} {} versions", list.versions().len(), distribution);
        Ok(list)
    }
}

// ── Cache ───────────────────────────────────────────────

pub fn cache_file(cache_dir: &Path, distribution: Distribution) -> PathBuf {
    cache_dir.join(distribution.as_str()).join(ALL_VERSIONS_FILE)
}

/// Read `all.json`. Missing, unparsable or hash-mismatched files are `None`.
pub async fn get_from_cache(cache_dir: &Path, distribution: Distribution) -> Option<VersionList> {
    let expected = HashSidecar::load(cache_dir)
        .await
        .versions_sha1
        .get(&distribution)
        .cloned()?;
    let bytes = tokio::fs::read(cache_file(cache_dir, distribution)).await.ok()?;
    if ExpectedHash::sha1(expected).mismatch(&bytes).is_some() {
        warn!("Cached {} version list failed its hash check", distribution);
        return None;
    }
    VersionList::parse(distribution, &bytes).ok()
}

/// Persist `list` as `all.json` and record its sha1 in the sidecar.
pub async fn write_cache(cache_dir: &Path, list: &VersionList) -> CoreResult<()> {
    let distribution = list.distribution();
    let bytes = list.to_bytes()?;
    write_bytes(&cache_file(cache_dir, distribution), &bytes).await?;
    HashSidecar::record_versions(cache_dir, distribution, HashAlgorithm::Sha1.digest_hex(&bytes))
        .await
}

// ── Fan-out ─────────────────────────────────────────────

/// Run `lookup` for every item with at most `limit` in flight, keeping
/// input order. Failed lookups are logged and dropped.
pub(crate) async fn fan_out<I, T, F, Fut>(items: Vec<I>, limit: usize, lookup: F) -> Vec<T>
where
    I: Display,
    F: Fn(I) -> Fut,
    Fut: Future<Output = CoreResult<T>>,
{
    stream::iter(items)
        .map(|item| {
            let label = item.to_string();
            let fut = lookup(item);
            async move { (label, fut.await) }
        })
        .buffered(limit.max(1))
        .filter_map(|(label, result)| async move {
            match result {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Skipping {}: {}", label, e);
                    None
                }
            }
        })
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::error::CoreError;
    use crate::core::testing::{manifest_json, scratch_dir, MapFetcher};
    use crate::core::version::manifest::VERSION_MANIFEST_URL;
    use crate::core::version::SpigotVersion;

    #[tokio::test]
    async fn cache_round_trip_is_hash_checked() {
        let dir = scratch_dir("catalog-cache");
        let list = VersionList::Spigot(vec![SpigotVersion { id: "1.21".into() }]);

        write_cache(&dir, &list).await.unwrap();
        assert_eq!(get_from_cache(&dir, Distribution::Spigot).await, Some(list));

        std::fs::write(cache_file(&dir, Distribution::Spigot), b"[]").unwrap();
        assert_eq!(get_from_cache(&dir, Distribution::Spigot).await, None);
    }

    #[tokio::test]
    async fn list_reads_cache_and_never_serves_stale_on_failure() {
        let dir = scratch_dir("catalog-list");
        let fetcher = Arc::new(MapFetcher::new().with(VERSION_MANIFEST_URL, manifest_json()));
        let store = ContentStore::new(fetcher.clone());
        let manifest = ManifestResolver::new(store.clone(), &dir);
        let mut ctx = CatalogContext {
            store: &store,
            manifest: &manifest,
            cache_dir: &dir,
            fan_out: 4,
            use_cache: true,
        };

        let catalog = Catalog::new(Distribution::Vanilla);
        let first = catalog.list(&ctx).await.unwrap();
        let second = catalog.list(&ctx).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(fetcher.hits(VERSION_MANIFEST_URL), 1);

        fetcher.fail(VERSION_MANIFEST_URL, 502);
        std::fs::remove_file(dir.join("version_manifest_v2.json")).unwrap();
        ctx.use_cache = false;
        let err = catalog.list(&ctx).await.unwrap_err();
        assert!(matches!(err, CoreError::DownloadFailed { status: 502, .. }));
    }

    #[tokio::test]
    async fn fan_out_drops_failures_and_keeps_order() {
        let out = fan_out(vec![1u32, 2, 3, 4], 2, |n| async move {
            if n == 3 {
                Err(CoreError::NotInManifest(n.to_string()))
            } else {
                Ok(n * 10)
            }
        })
        .await;
        assert_eq!(out, vec![10, 20, 40]);
    }
}
