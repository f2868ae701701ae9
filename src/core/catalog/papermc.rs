use async_trait::async_trait;
use serde::Deserialize;

use super::{fan_out, CatalogContext, VersionCatalog};
use crate::core::error::CoreResult;
use crate::core::version::{Distribution, PapermcEntry, VersionList};

pub const PAPER_PROJECT_URL: &str = "https://api.papermc.io/v2/projects/paper";

#[derive(Debug, Deserialize)]
struct PaperProject {
    versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PaperVersionBuilds {
    version: String,
    builds: Vec<u32>,
}

pub fn version_url(id: &str) -> String {
    format!("{}/versions/{}", PAPER_PROJECT_URL, id)
}

pub struct PapermcCatalog;

#[async_trait]
impl VersionCatalog for PapermcCatalog {
    fn distribution(&self) -> Distribution {
        Distribution::Papermc
    }

    async fn get_from_url(&self, ctx: &CatalogContext<'_>) -> CoreResult<VersionList> {
        let project: PaperProject = ctx.store.fetch_json(PAPER_PROJECT_URL).await?;

        // The API lists oldest first
        let ids: Vec<String> = project.versions.into_iter().rev().collect();

        let entries = fan_out(ids, ctx.fan_out, |id| async move {
            let info: PaperVersionBuilds = ctx.store.fetch_json(&version_url(&id)).await?;
            Ok(PapermcEntry {
                id: info.version,
                builds: info.builds,
            })
        })
        .await;

        Ok(VersionList::Papermc(entries))
    }
}
