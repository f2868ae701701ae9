use serde::Deserialize;
use tracing::{info, warn};

use super::{launch_arguments, DownloadSpec, JavaRequirement, VersionDescriptor};
use crate::core::catalog::fabric::server_jar_url;
use crate::core::catalog::papermc::PAPER_PROJECT_URL;
use crate::core::downloader::{ContentStore, ExpectedHash};
use crate::core::error::{CoreError, CoreResult};
use crate::core::version::version_file::VersionJson;
use crate::core::version::{ManifestResolver, PapermcVersion, SpigotVersion, Version};

pub const BUILD_TOOLS_URL: &str =
    "https://hub.spigotmc.org/jenkins/job/BuildTools/lastSuccessfulBuild/artifact/target/BuildTools.jar";
const SPIGOT_INFO_BASE: &str = "https://hub.spigotmc.org/versions";

/// Class-file major version of Java 1.0 is 45.
const CLASS_VERSION_OFFSET: u32 = 44;

/// Fields a distribution replaces on top of the vanilla descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorOverrides {
    pub download: DownloadSpec,
    pub java_version: Option<JavaRequirement>,
}

/// The vanilla descriptor with `overrides` applied.
pub fn derive_from(vanilla: VersionDescriptor, overrides: DescriptorOverrides) -> VersionDescriptor {
    VersionDescriptor {
        download: overrides.download,
        java_version: overrides.java_version.or(vanilla.java_version),
        arguments: vanilla.arguments,
    }
}

/// Build the descriptor of `version` from its upstream metadata.
pub async fn generate_version_json(
    store: &ContentStore,
    manifest: &ManifestResolver,
    version: &Version,
) -> CoreResult<VersionDescriptor> {
    info!("Generating descriptor for {} {}", version.distribution(), version.server_id());

    let vanilla = vanilla_descriptor(store, manifest, version.id()).await?;

    let overrides = match version {
        Version::Vanilla(_) => return Ok(vanilla),
        Version::Spigot(v) => spigot_overrides(store, v).await?,
        Version::Papermc(v) => papermc_overrides(store, v).await?,
        Version::Forge(v) => DescriptorOverrides {
            download: DownloadSpec {
                url: v.download_url.clone(),
                hash: None,
            },
            java_version: None,
        },
        Version::Mohistmc(v) => DescriptorOverrides {
            download: DownloadSpec {
                url: v.jar_url.clone(),
                hash: v.jar_sha256.clone(),
            },
            java_version: None,
        },
        Version::Fabric(v) => DescriptorOverrides {
            download: DownloadSpec {
                url: server_jar_url(&v.id, &v.loader, &v.installer),
                hash: None,
            },
            java_version: None,
        },
    };

    Ok(derive_from(vanilla, overrides))
}

// ── Vanilla ─────────────────────────────────────────────

/// Descriptor of the vanilla server `id`, from its manifest record.
pub async fn vanilla_descriptor(
    store: &ContentStore,
    manifest: &ManifestResolver,
    id: &str,
) -> CoreResult<VersionDescriptor> {
    // A cached manifest can predate a fresh release
    let entry = match manifest.find_version(id, true).await {
        Err(CoreError::NotInManifest(_)) => manifest.find_version(id, false).await?,
        other => other?,
    };

    let hash = entry.sha1.clone().map(ExpectedHash::sha1);
    let bytes = store.fetch_verified(&entry.url, hash.as_ref()).await?;
    let meta: VersionJson = serde_json::from_slice(&bytes)?;

    let server = meta
        .downloads
        .and_then(|d| d.server)
        .ok_or_else(|| CoreError::NoServerDownload(id.to_string()))?;

    let java_version = match meta.java_version {
        Some(java) => JavaRequirement {
            component: java.component,
            major_version: java.major_version,
        },
        None => JavaRequirement {
            component: Some("jre-legacy".to_string()),
            major_version: Some(8),
        },
    };

    Ok(VersionDescriptor {
        download: DownloadSpec {
            url: server.url,
            hash: Some(server.sha1),
        },
        java_version: Some(java_version),
        arguments: launch_arguments(Vec::new(), true),
    })
}

// ── Spigot ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpigotInfo {
    #[serde(default)]
    java_versions: Vec<u32>,
}

async fn spigot_overrides(store: &ContentStore, v: &SpigotVersion) -> CoreResult<DescriptorOverrides> {
    let url = format!("{}/{}.json", SPIGOT_INFO_BASE, v.id);
    let info: SpigotInfo = store.fetch_json(&url).await?;

    // `javaVersions` is [oldest, newest] supported class-file version
    let java_version = match info.java_versions.get(1) {
        Some(&class_version) if class_version > CLASS_VERSION_OFFSET => Some(JavaRequirement {
            component: None,
            major_version: Some(class_version - CLASS_VERSION_OFFSET),
        }),
        _ => {
            warn!("No usable javaVersions for spigot {}, keeping vanilla runtime", v.id);
            None
        }
    };

    Ok(DescriptorOverrides {
        download: DownloadSpec {
            url: BUILD_TOOLS_URL.to_string(),
            hash: None,
        },
        java_version,
    })
}

// ── Paper ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PaperBuildInfo {
    downloads: PaperDownloads,
}

#[derive(Debug, Deserialize)]
struct PaperDownloads {
    application: PaperApplication,
}

#[derive(Debug, Deserialize)]
struct PaperApplication {
    name: String,
    sha256: String,
}

pub fn paper_build_url(v: &PapermcVersion) -> String {
    format!("{}/versions/{}/builds/{}", PAPER_PROJECT_URL, v.id, v.build)
}

async fn papermc_overrides(store: &ContentStore, v: &PapermcVersion) -> CoreResult<DescriptorOverrides> {
    let build_url = paper_build_url(v);
    let info: PaperBuildInfo = store.fetch_json(&build_url).await?;
    let application = info.downloads.application;

    Ok(DescriptorOverrides {
        download: DownloadSpec {
            url: format!("{}/downloads/{}", build_url, application.name),
            hash: Some(application.sha256),
        },
        java_version: None,
    })
}
