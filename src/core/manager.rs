use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::core::catalog::{Catalog, CatalogContext};
use crate::core::config::CoreConfig;
use crate::core::downloader::{ContentStore, Fetcher, HttpFetcher};
use crate::core::error::CoreResult;
use crate::core::eula::EulaPrompt;
use crate::core::http::build_http_client;
use crate::core::loaders::{self, ExecRuntime, InstallContext, ReadyServer};
use crate::core::version::{Distribution, ManifestResolver, Version, VersionList};

/// Entry point for listing, installing and uninstalling server versions.
///
/// Operations on the same cache directory must be serialized by the caller.
pub struct VersionManager {
    config: CoreConfig,
    store: ContentStore,
    manifest: ManifestResolver,
}

impl VersionManager {
    /// Manager backed by a `reqwest` client built from `config`.
    pub fn new(config: CoreConfig) -> CoreResult<Self> {
        let client = build_http_client(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(HttpFetcher::new(client))))
    }

    pub fn with_fetcher(config: CoreConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let store = ContentStore::new(fetcher);
        let manifest = ManifestResolver::new(store.clone(), config.cache_dir.clone());
        Self {
            config,
            store,
            manifest,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn manifest(&self) -> &ManifestResolver {
        &self.manifest
    }

    /// Installable versions of `distribution`, newest first.
    pub async fn list_versions(
        &self,
        distribution: Distribution,
        use_cache: bool,
    ) -> CoreResult<VersionList> {
        let ctx = CatalogContext {
            store: &self.store,
            manifest: &self.manifest,
            cache_dir: &self.config.cache_dir,
            fan_out: self.config.fan_out,
            use_cache,
        };
        Catalog::new(distribution).list(&ctx).await
    }

    /// Build or reuse `version` and stage it into `workdir`.
    pub async fn install(
        &self,
        version: &Version,
        workdir: &Path,
        exec: &dyn ExecRuntime,
        prompt: &dyn EulaPrompt,
    ) -> CoreResult<ReadyServer> {
        let ctx = InstallContext {
            store: &self.store,
            manifest: &self.manifest,
            cache_dir: &self.config.cache_dir,
            exec,
        };
        loaders::install(&ctx, version, workdir, prompt).await
    }

    /// Move the server files of `version` from `workdir` back into the cache.
    pub async fn uninstall(&self, version: &Version, workdir: &Path) -> CoreResult<()> {
        loaders::uninstall(&self.config.cache_dir, version, workdir).await?;
        info!("Parked {} {} in cache", version.distribution(), version.server_id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::papermc::{version_url, PAPER_PROJECT_URL};
    use crate::core::descriptor::SERVER_JAR;
    use crate::core::downloader::HashAlgorithm;
    use crate::core::testing::{
        mojang_fetcher, scratch_dir, CountingPrompt, MapFetcher, ScriptedExec,
    };

    fn manager(name: &str, fetcher: Arc<MapFetcher>) -> (VersionManager, std::path::PathBuf) {
        let dir = scratch_dir(name);
        let config = CoreConfig::with_cache_dir(dir.join("cache"));
        (VersionManager::with_fetcher(config, fetcher), dir)
    }

    #[tokio::test]
    async fn vanilla_list_is_cached_and_reused() {
        let fetcher = Arc::new(mojang_fetcher());
        let (manager, _dir) = manager("manager-vanilla-list", fetcher.clone());

        let first = manager.list_versions(Distribution::Vanilla, true).await.unwrap();
        let second = manager.list_versions(Distribution::Vanilla, true).await.unwrap();

        assert_eq!(first, second);
        let ids: Vec<String> = first.versions().iter().map(|v| v.id().to_string()).collect();
        assert_eq!(ids.first().map(String::as_str), Some("1.21"));
        assert!(ids.contains(&"1.3".to_string()));
        assert!(!ids.contains(&"1.2.5".to_string()));
        assert!(first
            .versions()
            .iter()
            .any(|v| matches!(v, Version::Vanilla(v) if v.id == "24w14a" && !v.release)));
        assert_eq!(
            fetcher.hits(crate::core::version::manifest::VERSION_MANIFEST_URL),
            1
        );
    }

    #[tokio::test]
    async fn papermc_list_then_install() {
        let jar = b"paper-1.21-130".to_vec();
        let build_url = format!("{}/builds/130", version_url("1.21"));
        let fetcher = Arc::new(
            mojang_fetcher()
                .with(
                    PAPER_PROJECT_URL,
                    serde_json::to_vec(&serde_json::json!({"versions": ["1.20.1", "1.21"]}))
                        .unwrap(),
                )
                .with(
                    &version_url("1.21"),
                    serde_json::to_vec(&serde_json::json!({"version": "1.21", "builds": [130]})).unwrap(),
                )
                .with(
                    &version_url("1.20.1"),
                    serde_json::to_vec(&serde_json::json!({"version": "1.20.1", "builds": [196]})).unwrap(),
                )
                .with(
                    &build_url,
                    serde_json::to_vec(&serde_json::json!({
                        "downloads": {"application": {
                            "name": "paper-1.21-130.jar",
                            "sha256": HashAlgorithm::Sha256.digest_hex(&jar)
                        }}
                    }))
                    .unwrap(),
                )
                .with(&format!("{}/downloads/paper-1.21-130.jar", build_url), jar.clone()),
        );
        let (manager, dir) = manager("manager-papermc", fetcher);

        let list = manager.list_versions(Distribution::Papermc, false).await.unwrap();
        let newest = list.versions().into_iter().next().unwrap();
        assert_eq!(newest.server_id(), "1.21_130");

        let exec = ScriptedExec::unused();
        let prompt = CountingPrompt::answering(true);
        let workdir = dir.join("work");
        manager.install(&newest, &workdir, &exec, &prompt).await.unwrap();
        assert_eq!(std::fs::read(workdir.join(SERVER_JAR)).unwrap(), jar);

        manager.uninstall(&newest, &workdir).await.unwrap();
        assert!(!workdir.join(SERVER_JAR).exists());
        assert!(dir.join("cache/papermc/1.21_130").join(SERVER_JAR).exists());
    }
}
