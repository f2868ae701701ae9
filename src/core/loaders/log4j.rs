// ─── Log4Shell mitigation ───
// Picks the JVM flag (and, for older releases, the replacement logging
// config) a server needs, based on where its id sits in the manifest.

use crate::core::version::VersionManifest;

pub const NO_LOOKUPS_ARG: &str = "-Dlog4j2.formatMsgNoLookups=true";

/// First release shipping a fixed log4j.
const PATCHED_FROM: &str = "1.18.1";
const NO_LOOKUPS_FROM: &str = "1.17";
const CONFIG_112_FROM: &str = "1.12";
const CONFIG_17_FROM: &str = "1.7.2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Log4jConfig {
    pub file_name: &'static str,
    pub url: &'static str,
}

pub const CONFIG_17_111: Log4jConfig = Log4jConfig {
    file_name: "log4j2_17-111.xml",
    url: "https://launcher.mojang.com/v1/objects/4bb89a97a66f350bc9f73b3ca8509632682aea2e/log4j2_17-111.xml",
};

pub const CONFIG_112_116: Log4jConfig = Log4jConfig {
    file_name: "log4j2_112-116.xml",
    url: "https://launcher.mojang.com/v1/objects/02937d122c86ce73319ef9975b58896fc1b491d1/log4j2_112-116.xml",
};

/// Every config file a patch may stage into a working directory.
pub const CONFIG_FILES: [Log4jConfig; 2] = [CONFIG_17_111, CONFIG_112_116];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log4jPatch {
    pub arg: String,
    pub config: Option<Log4jConfig>,
}

impl Log4jPatch {
    fn flag(arg: &str) -> Self {
        Self {
            arg: arg.to_string(),
            config: None,
        }
    }

    fn config(config: Log4jConfig) -> Self {
        Self {
            arg: format!("-Dlog4j.configurationFile={}", config.file_name),
            config: Some(config),
        }
    }
}

/// The mitigation for server `id`, or `None` when it needs none.
pub fn patch_for(manifest: &VersionManifest, id: &str) -> Option<Log4jPatch> {
    let since = |pivot: &str| manifest.is_at_or_after(id, pivot).unwrap_or(false);

    if manifest.find_version(id).is_none() || since(PATCHED_FROM) {
        None
    } else if since(NO_LOOKUPS_FROM) {
        Some(Log4jPatch::flag(NO_LOOKUPS_ARG))
    } else if since(CONFIG_112_FROM) {
        Some(Log4jPatch::config(CONFIG_112_116))
    } else if since(CONFIG_17_FROM) {
        Some(Log4jPatch::config(CONFIG_17_111))
    } else {
        None
    }
}
