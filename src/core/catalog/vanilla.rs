use async_trait::async_trait;

use super::{CatalogContext, VersionCatalog};
use crate::core::error::CoreResult;
use crate::core::version::{Distribution, VanillaVersion, VersionList, VersionManifest};

/// Oldest release that ships a multiplayer server jar.
const FLOOR_ID: &str = "1.3";
/// Newest release without one, used when the floor id is missing.
const LAST_UNSUPPORTED_ID: &str = "1.2.5";

pub struct VanillaCatalog;

#[async_trait]
impl VersionCatalog for VanillaCatalog {
    fn distribution(&self) -> Distribution {
        Distribution::Vanilla
    }

    async fn get_from_url(&self, ctx: &CatalogContext<'_>) -> CoreResult<VersionList> {
        let manifest = ctx.manifest.get_manifest(ctx.use_cache).await?;
        Ok(VersionList::Vanilla(server_versions(&manifest)))
    }
}

/// Manifest entries at or above the floor, newest first.
pub(crate) fn server_versions(manifest: &VersionManifest) -> Vec<VanillaVersion> {
    let end = match manifest.position(FLOOR_ID) {
        Some(pos) => pos + 1,
        None => manifest
            .position(LAST_UNSUPPORTED_ID)
            .unwrap_or(manifest.versions.len()),
    };

    manifest.versions[..end]
        .iter()
        .map(|entry| VanillaVersion {
            id: entry.id.clone(),
            release: entry.is_release(),
        })
        .collect()
}
