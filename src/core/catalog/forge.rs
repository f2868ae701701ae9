use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::{fan_out, CatalogContext, VersionCatalog};
use crate::core::error::{CoreError, CoreResult};
use crate::core::version::{Distribution, ForgeBuild, ForgeEntry, VersionList};

pub const FORGE_INDEX_URL: &str = "https://files.minecraftforge.net/net/minecraftforge/forge/";

/// Versions whose downloads predate the installer.
const NO_INSTALLER_IDS: &[&str] = &[
    "1.5.1", "1.5", "1.4.7", "1.4.6", "1.4.5", "1.4.4", "1.4.3", "1.4.2", "1.4.1", "1.4.0",
    "1.3.2", "1.2.5", "1.2.4", "1.2.3", "1.1",
];

static INDEX_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="index_([a-z0-9_.-]+)\.html""#).expect("index link pattern"));
static DOWNLOAD_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<table[^>]*class="[^"]*download-list[^"]*"[^>]*>(.*?)</table>"#)
        .expect("download table pattern")
});
static ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("row pattern"));
static VERSION_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<td[^>]*class="[^"]*download-version[^"]*"[^>]*>(.*?)</td>"#)
        .expect("version cell pattern")
});
static INSTALLER_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="(https://maven\.minecraftforge\.net/[^"]+-installer\.jar)""#)
        .expect("installer link pattern")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("tag pattern"));
static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<div[^>]*class="title"[^>]*>(.*?)</div>"#).expect("title pattern")
});
static SMALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<small[^>]*>(.*?)</small>").expect("small pattern"));
static BUILD_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d.]+ - (.+)$").expect("build label pattern"));

pub fn version_page_url(id: &str) -> String {
    format!("{}index_{}.html", FORGE_INDEX_URL, id)
}

pub struct ForgeCatalog;

#[async_trait]
impl VersionCatalog for ForgeCatalog {
    fn distribution(&self) -> Distribution {
        Distribution::Forge
    }

    async fn get_from_url(&self, ctx: &CatalogContext<'_>) -> CoreResult<VersionList> {
        let index = ctx.store.fetch_text(FORGE_INDEX_URL).await?;
        let ids: Vec<String> = scrape_index(&index)?
            .into_iter()
            .filter(|id| !NO_INSTALLER_IDS.contains(&id.as_str()))
            .collect();

        let entries = fan_out(ids, ctx.fan_out, |id| async move {
            let url = version_page_url(&id);
            let page = ctx.store.fetch_text(&url).await?;
            scrape_version_page(&id, &url, &page)
        })
        .await;

        Ok(VersionList::Forge(entries))
    }
}

// ── Scraping ────────────────────────────────────────────

/// Version ids linked from the sidebar version list.
fn scrape_index(page: &str) -> CoreResult<Vec<String>> {
    let start = page
        .find("li-version-list")
        .ok_or_else(|| CoreError::markup(FORGE_INDEX_URL, "no version list in sidebar"))?;
    let ids: Vec<String> = INDEX_LINK
        .captures_iter(&page[start..])
        .map(|c| c[1].to_string())
        .collect();
    if ids.is_empty() {
        return Err(CoreError::markup(FORGE_INDEX_URL, "version list has no links"));
    }
    Ok(ids)
}

/// All (build, installer) pairs of one version page plus its recommended build.
fn scrape_version_page(id: &str, url: &str, page: &str) -> CoreResult<ForgeEntry> {
    let body = DOWNLOAD_TABLE
        .captures(page)
        .and_then(|c| c.get(1))
        .ok_or_else(|| CoreError::markup(url, "no download-list table"))?;

    let mut forge_versions = Vec::new();
    for cells in ROW.captures_iter(body.as_str()) {
        let cells = &cells[1];
        let Some(version) = VERSION_CELL
            .captures(cells)
            .and_then(|c| first_token(&TAG.replace_all(&c[1], " ")))
        else {
            continue;
        };
        let Some(link) = INSTALLER_LINK.captures(cells) else {
            continue;
        };
        forge_versions.push(ForgeBuild {
            version,
            url: link[1].to_string(),
        });
    }

    let recommended = match scrape_recommended(page) {
        Some(build) if forge_versions.iter().any(|v| v.version == build) => Some(build),
        Some(build) => {
            warn!("Recommended forge {} for {} is not in its download table", build, id);
            None
        }
        None => None,
    };

    Ok(ForgeEntry {
        id: id.to_string(),
        forge_versions,
        recommended,
    })
}

/// The build named by the "Recommended" download title (`<mc> - <build>`).
fn scrape_recommended(page: &str) -> Option<String> {
    TITLE
        .captures_iter(page)
        .filter(|c| c[1].contains("Recommended"))
        .find_map(|c| {
            let text = SMALL.captures(&c[1])?.get(1)?.as_str().trim().to_string();
            BUILD_LABEL.captures(&text).map(|m| m[1].trim().to_string())
        })
}

fn first_token(text: &str) -> Option<String> {
    text.split_whitespace().next().map(str::to_string)
}
