// ─── McServerCore ───
// Discovery, caching and installation of Minecraft server distributions.
//
// Architecture:
//   core/
//     downloader/ - Byte transport + hash-verified content store
//     version/    - Mojang manifest, version model, hash sidecar
//     catalog/    - Per-distribution version discovery + list cache
//     descriptor/ - Normalized version.json builder
//     loaders/    - Materialize, stage and park server files
//     eula.rs     - eula.txt consent gate
//     manager.rs  - Facade over all of the above

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod downloader;
pub mod error;
pub mod eula;
pub mod fsutil;
pub mod http;
pub mod loaders;
pub mod manager;
pub mod version;

#[cfg(test)]
pub mod testing;
