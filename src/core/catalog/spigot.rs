use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::{CatalogContext, VersionCatalog};
use crate::core::error::{CoreError, CoreResult};
use crate::core::version::{Distribution, SpigotVersion, VersionList};

pub const SPIGOT_VERSIONS_URL: &str = "https://hub.spigotmc.org/versions/";

/// `--rev 1.20` builds 1.20.1, so it is never offered.
const EXCLUDED_IDS: &[&str] = &["1.20"];

static PRE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<pre[^>]*>(.*?)</pre>").expect("listing pattern"));
static VERSION_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*href="(\d+\.\d+(?:\.\d+)?)\.json""#).expect("version link pattern")
});

pub struct SpigotCatalog;

#[async_trait]
impl VersionCatalog for SpigotCatalog {
    fn distribution(&self) -> Distribution {
        Distribution::Spigot
    }

    async fn get_from_url(&self, ctx: &CatalogContext<'_>) -> CoreResult<VersionList> {
        let page = ctx.store.fetch_text(SPIGOT_VERSIONS_URL).await?;
        let ids = scrape_ids(&page)?;

        let ordered = match ctx.manifest.get_manifest(ctx.use_cache).await {
            Ok(manifest) => manifest.order_ids(&ids),
            Err(e) => {
                warn!("Spigot ids left unordered, manifest unavailable: {}", e);
                ids
            }
        };

        Ok(VersionList::Spigot(
            ordered
                .into_iter()
                .filter(|id| !EXCLUDED_IDS.contains(&id.as_str()))
                .map(|id| SpigotVersion { id })
                .collect(),
        ))
    }
}

/// Version ids linked from the `<pre>` directory listing.
fn scrape_ids(page: &str) -> CoreResult<Vec<String>> {
    let listing = PRE_BLOCK
        .captures(page)
        .and_then(|c| c.get(1))
        .ok_or_else(|| CoreError::markup(SPIGOT_VERSIONS_URL, "no <pre> directory listing"))?;

    Ok(VERSION_LINK
        .captures_iter(listing.as_str())
        .map(|c| c[1].to_string())
        .collect())
}
