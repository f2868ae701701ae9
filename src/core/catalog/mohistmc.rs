use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::{fan_out, CatalogContext, VersionCatalog};
use crate::core::error::CoreResult;
use crate::core::version::{Distribution, MohistmcBuild, MohistmcEntry, VersionList};

pub const MOHIST_API_URL: &str = "https://api.mohistmc.com/project/mohist";

#[derive(Debug, Deserialize)]
struct MohistVersionName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MohistBuildInfo {
    id: u32,
    #[serde(default)]
    file_sha256: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    loader: Option<MohistLoader>,
}

#[derive(Debug, Deserialize)]
struct MohistLoader {
    #[serde(default)]
    forge_version: Option<String>,
}

pub fn versions_url() -> String {
    format!("{}/versions", MOHIST_API_URL)
}

pub fn builds_url(id: &str) -> String {
    format!("{}/{}/builds", MOHIST_API_URL, id)
}

pub fn jar_url(id: &str, build: u32) -> String {
    format!("{}/{}/builds/{}/download", MOHIST_API_URL, id, build)
}

pub struct MohistmcCatalog;

#[async_trait]
impl VersionCatalog for MohistmcCatalog {
    fn distribution(&self) -> Distribution {
        Distribution::Mohistmc
    }

    async fn get_from_url(&self, ctx: &CatalogContext<'_>) -> CoreResult<VersionList> {
        let names: Vec<MohistVersionName> = ctx.store.fetch_json(&versions_url()).await?;
        let names: Vec<String> = names.into_iter().map(|v| v.name).collect();

        let ids = match ctx.manifest.get_manifest(ctx.use_cache).await {
            Ok(manifest) => manifest.order_ids(&names),
            Err(e) => {
                warn!("Mohist ids left unordered, manifest unavailable: {}", e);
                names
            }
        };

        let entries = fan_out(ids, ctx.fan_out, |id| async move {
            let builds: Vec<MohistBuildInfo> = ctx.store.fetch_json(&builds_url(&id)).await?;
            Ok(MohistmcEntry {
                builds: usable_builds(&id, builds),
                id,
            })
        })
        .await;

        Ok(VersionList::Mohistmc(entries))
    }
}

/// Successful, numbered builds, highest id first.
fn usable_builds(id: &str, builds: Vec<MohistBuildInfo>) -> Vec<MohistmcBuild> {
    let mut usable: Vec<MohistmcBuild> = builds
        .into_iter()
        .filter(|b| b.id != 0)
        .filter(|b| {
            b.status
                .as_deref()
                .map_or(true, |s| s.eq_ignore_ascii_case("success"))
        })
        .map(|b| MohistmcBuild {
            number: b.id,
            forge_version: b.loader.and_then(|l| l.forge_version),
            jar_url: jar_url(id, b.id),
            jar_sha256: b.file_sha256,
        })
        .collect();
    usable.sort_by(|a, b| b.number.cmp(&a.number));
    usable
}
