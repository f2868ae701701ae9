use async_trait::async_trait;
use serde::Deserialize;

use super::{CatalogContext, VersionCatalog};
use crate::core::error::CoreResult;
use crate::core::version::{Distribution, FabricGame, FabricTables, VersionList};

pub const FABRIC_META_BASE: &str = "https://meta.fabricmc.net/v2";

/// Oldest loader minor with a server launcher.
const MIN_LOADER_MINOR: u32 = 12;
/// Oldest installer minor that can produce a server jar.
const MIN_INSTALLER_MINOR: u32 = 8;

#[derive(Debug, Deserialize)]
struct FabricGameJson {
    version: String,
}

#[derive(Debug, Deserialize)]
struct FabricComponentJson {
    version: String,
}

pub fn versions_url(kind: &str) -> String {
    format!("{}/versions/{}", FABRIC_META_BASE, kind)
}

pub fn server_jar_url(game: &str, loader: &str, installer: &str) -> String {
    format!(
        "{}/versions/loader/{}/{}/{}/server/jar",
        FABRIC_META_BASE, game, loader, installer
    )
}

pub struct FabricCatalog;

#[async_trait]
impl VersionCatalog for FabricCatalog {
    fn distribution(&self) -> Distribution {
        Distribution::Fabric
    }

    async fn get_from_url(&self, ctx: &CatalogContext<'_>) -> CoreResult<VersionList> {
        let games_url = versions_url("game");
        let loaders_url = versions_url("loader");
        let installers_url = versions_url("installer");

        let (games, loaders, installers, manifest) = tokio::join!(
            ctx.store.fetch_json::<Vec<FabricGameJson>>(&games_url),
            ctx.store.fetch_json::<Vec<FabricComponentJson>>(&loaders_url),
            ctx.store.fetch_json::<Vec<FabricComponentJson>>(&installers_url),
            ctx.manifest.get_manifest(ctx.use_cache),
        );
        let (games, loaders, installers, manifest) = (games?, loaders?, installers?, manifest?);

        // Only games the vanilla manifest knows have a server to wrap
        let games = games
            .into_iter()
            .filter_map(|g| {
                manifest.find_version(&g.version).map(|entry| FabricGame {
                    id: entry.id.clone(),
                    release: entry.is_release(),
                })
            })
            .collect();

        Ok(VersionList::Fabric(FabricTables {
            games,
            loaders: at_least_minor(loaders, MIN_LOADER_MINOR),
            installers: at_least_minor(installers, MIN_INSTALLER_MINOR),
        }))
    }
}

fn at_least_minor(components: Vec<FabricComponentJson>, min: u32) -> Vec<String> {
    components
        .into_iter()
        .map(|c| c.version)
        .filter(|v| {
            v.split('.')
                .nth(1)
                .and_then(|minor| minor.parse::<u32>().ok())
                .is_some_and(|minor| minor >= min)
        })
        .collect()
}
