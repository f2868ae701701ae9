pub mod manifest;
pub mod model;
pub mod sidecar;
pub mod version_file;

pub use manifest::{ManifestResolver, VersionEntry, VersionManifest};
pub use model::{
    Distribution, FabricGame, FabricTables, FabricVersion, ForgeBuild, ForgeEntry, ForgeVersion,
    MohistmcBuild, MohistmcEntry, MohistmcVersion, PapermcEntry, PapermcVersion, Runtime,
    SpigotVersion, VanillaVersion, Version, VersionList,
};
pub use sidecar::HashSidecar;
