// ─── Version Model ───
// Distribution identifiers, installable versions and the per-distribution
// list shapes persisted as `all.json`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::CoreResult;

/// One of the six supported server distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    Vanilla,
    Spigot,
    Papermc,
    Forge,
    Mohistmc,
    Fabric,
}

impl Distribution {
    pub const fn all() -> [Distribution; 6] {
        [
            Distribution::Vanilla,
            Distribution::Spigot,
            Distribution::Papermc,
            Distribution::Forge,
            Distribution::Mohistmc,
            Distribution::Fabric,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Distribution::Vanilla => "vanilla",
            Distribution::Spigot => "spigot",
            Distribution::Papermc => "papermc",
            Distribution::Forge => "forge",
            Distribution::Mohistmc => "mohistmc",
            Distribution::Fabric => "fabric",
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Distribution::all()
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown distribution: {}", s))
    }
}

// ─── Installable versions ───

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VanillaVersion {
    pub id: String,
    pub release: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpigotVersion {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PapermcVersion {
    pub id: String,
    pub build: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeVersion {
    pub id: String,
    pub forge_version: String,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MohistmcVersion {
    pub id: String,
    pub build: u32,
    #[serde(default)]
    pub forge_version: Option<String>,
    pub jar_url: String,
    #[serde(default)]
    pub jar_sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FabricVersion {
    pub id: String,
    pub release: bool,
    pub loader: String,
    pub installer: String,
}

/// A concrete installable server version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Version {
    Vanilla(VanillaVersion),
    Spigot(SpigotVersion),
    Papermc(PapermcVersion),
    Forge(ForgeVersion),
    Mohistmc(MohistmcVersion),
    Fabric(FabricVersion),
}

impl Version {
    pub fn distribution(&self) -> Distribution {
        match self {
            Version::Vanilla(_) => Distribution::Vanilla,
            Version::Spigot(_) => Distribution::Spigot,
            Version::Papermc(_) => Distribution::Papermc,
            Version::Forge(_) => Distribution::Forge,
            Version::Mohistmc(_) => Distribution::Mohistmc,
            Version::Fabric(_) => Distribution::Fabric,
        }
    }

    /// The Minecraft version id this server runs.
    pub fn id(&self) -> &str {
        match self {
            Version::Vanilla(v) => &v.id,
            Version::Spigot(v) => &v.id,
            Version::Papermc(v) => &v.id,
            Version::Forge(v) => &v.id,
            Version::Mohistmc(v) => &v.id,
            Version::Fabric(v) => &v.id,
        }
    }

    /// Directory name of this version under `<cache>/<distribution>/`.
    pub fn server_id(&self) -> String {
        match self {
            Version::Vanilla(v) => v.id.clone(),
            Version::Spigot(v) => v.id.clone(),
            Version::Papermc(v) => format!("{}_{}", v.id, v.build),
            Version::Forge(v) => format!("{}_{}", v.id, v.forge_version),
            Version::Mohistmc(v) => format!("{}_{}", v.id, v.build),
            Version::Fabric(v) => format!("{}_{}_{}", v.id, v.loader, v.installer),
        }
    }

    pub fn vanilla(id: impl Into<String>) -> Self {
        Version::Vanilla(VanillaVersion {
            id: id.into(),
            release: true,
        })
    }
}

// ─── Persisted list shapes ───

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PapermcEntry {
    pub id: String,
    pub builds: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgeBuild {
    pub version: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeEntry {
    pub id: String,
    pub forge_versions: Vec<ForgeBuild>,
    #[serde(default)]
    pub recommended: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MohistmcBuild {
    pub number: u32,
    #[serde(default)]
    pub forge_version: Option<String>,
    pub jar_url: String,
    #[serde(default)]
    pub jar_sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MohistmcEntry {
    pub id: String,
    pub builds: Vec<MohistmcBuild>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricGame {
    pub id: String,
    pub release: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricTables {
    pub games: Vec<FabricGame>,
    pub loaders: Vec<String>,
    pub installers: Vec<String>,
}

/// A distribution's discovered versions, as stored in `all.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VersionList {
    Vanilla(Vec<VanillaVersion>),
    Spigot(Vec<SpigotVersion>),
    Papermc(Vec<PapermcEntry>),
    Forge(Vec<ForgeEntry>),
    Mohistmc(Vec<MohistmcEntry>),
    Fabric(FabricTables),
}

impl VersionList {
    /// Parse a stored list, using `distribution` to pick the shape.
    pub fn parse(distribution: Distribution, bytes: &[u8]) -> CoreResult<Self> {
        Ok(match distribution {
            Distribution::Vanilla => VersionList::Vanilla(serde_json::from_slice(bytes)?),
            Distribution::Spigot => VersionList::Spigot(serde_json::from_slice(bytes)?),
            Distribution::Papermc => VersionList::Papermc(serde_json::from_slice(bytes)?),
            Distribution::Forge => VersionList::Forge(serde_json::from_slice(bytes)?),
            Distribution::Mohistmc => VersionList::Mohistmc(serde_json::from_slice(bytes)?),
            Distribution::Fabric => VersionList::Fabric(serde_json::from_slice(bytes)?),
        })
    }

    pub fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn distribution(&self) -> Distribution {
        match self {
            VersionList::Vanilla(_) => Distribution::Vanilla,
            VersionList::Spigot(_) => Distribution::Spigot,
            VersionList::Papermc(_) => Distribution::Papermc,
            VersionList::Forge(_) => Distribution::Forge,
            VersionList::Mohistmc(_) => Distribution::Mohistmc,
            VersionList::Fabric(_) => Distribution::Fabric,
        }
    }

    /// Every installable version in the list, newest first where the
    /// source is ordered. Fabric tables combine by full cross product.
    pub fn versions(&self) -> Vec<Version> {
        match self {
            VersionList::Vanilla(list) => list.iter().cloned().map(Version::Vanilla).collect(),
            VersionList::Spigot(list) => list.iter().cloned().map(Version::Spigot).collect(),
            VersionList::Papermc(list) => list
                .iter()
                .flat_map(|entry| {
                    entry.builds.iter().map(move |&build| {
                        Version::Papermc(PapermcVersion {
                            id: entry.id.clone(),
                            build,
                        })
                    })
                })
                .collect(),
            VersionList::Forge(list) => list
                .iter()
                .flat_map(|entry| {
                    entry.forge_versions.iter().map(move |build| {
                        Version::Forge(ForgeVersion {
                            id: entry.id.clone(),
                            forge_version: build.version.clone(),
                            download_url: build.url.clone(),
                        })
                    })
                })
                .collect(),
            VersionList::Mohistmc(list) => list
                .iter()
                .flat_map(|entry| {
                    entry.builds.iter().map(move |build| {
                        Version::Mohistmc(MohistmcVersion {
                            id: entry.id.clone(),
                            build: build.number,
                            forge_version: build.forge_version.clone(),
                            jar_url: build.jar_url.clone(),
                            jar_sha256: build.jar_sha256.clone(),
                        })
                    })
                })
                .collect(),
            VersionList::Fabric(tables) => {
                let mut out = Vec::with_capacity(
                    tables.games.len() * tables.loaders.len() * tables.installers.len(),
                );
                for game in &tables.games {
                    for loader in &tables.loaders {
                        for installer in &tables.installers {
                            out.push(Version::Fabric(FabricVersion {
                                id: game.id.clone(),
                                release: game.release,
                                loader: loader.clone(),
                                installer: installer.clone(),
                            }));
                        }
                    }
                }
                out
            }
        }
    }
}

// ─── Java runtime selection ───

/// The Java runtime a server needs, handed to the exec callback and to the
/// caller's process supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Runtime {
    /// A Mojang-distributed runtime component such as `java-runtime-gamma`.
    Minecraft { version: String },
    /// Any runtime of the given Java major version.
    #[serde(rename_all = "camelCase")]
    Universal { major_version: u32 },
}

impl Runtime {
    pub fn legacy() -> Self {
        Runtime::Minecraft {
            version: "jre-legacy".to_string(),
        }
    }
}
