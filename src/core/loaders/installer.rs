use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::context::InstallContext;
use super::{
    fabric::FabricInstaller, forge::ForgeInstaller, mohistmc::MohistmcInstaller,
    papermc::PapermcInstaller, spigot::SpigotInstaller, vanilla::VanillaInstaller,
};
use crate::core::descriptor::{VersionDescriptor, SERVER_JAR};
use crate::core::downloader::{ExpectedHash, HashAlgorithm};
use crate::core::error::{CoreError, CoreResult};
use crate::core::fsutil;
use crate::core::version::Version;

/// Files every server keeps between installs, besides the jar.
const COMMON_SECONDARY_FILES: [&str; 2] = ["libraries", "eula.txt"];

/// Per-distribution steps of the install template.
#[async_trait]
pub trait ServerInstaller: Send + Sync {
    fn server_id(&self) -> String;

    /// Distribution specific files to carry between cache and workdir.
    fn extra_files(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the cache already holds a runnable artifact.
    async fn is_materialized(&self, server_dir: &Path) -> bool {
        fsutil::exists(&server_dir.join(SERVER_JAR)).await
    }

    /// Produce the cached artifact and return the final descriptor.
    async fn materialize(
        &self,
        ctx: &InstallContext<'_>,
        server_dir: &Path,
        descriptor: VersionDescriptor,
    ) -> CoreResult<VersionDescriptor>;
}

/// Dispatcher over the six installers.
pub enum Installer {
    Vanilla(VanillaInstaller),
    Spigot(SpigotInstaller),
    Papermc(PapermcInstaller),
    Forge(ForgeInstaller),
    Mohistmc(MohistmcInstaller),
    Fabric(FabricInstaller),
}

impl Installer {
    pub fn new(version: &Version) -> Self {
        match version {
            Version::Vanilla(v) => Self::Vanilla(VanillaInstaller::new(v.clone())),
            Version::Spigot(v) => Self::Spigot(SpigotInstaller::new(v.clone())),
            Version::Papermc(v) => Self::Papermc(PapermcInstaller::new(v.clone())),
            Version::Forge(v) => Self::Forge(ForgeInstaller::new(v.clone())),
            Version::Mohistmc(v) => Self::Mohistmc(MohistmcInstaller::new(v.clone())),
            Version::Fabric(v) => Self::Fabric(FabricInstaller::new(v.clone())),
        }
    }

    fn inner(&self) -> &dyn ServerInstaller {
        match self {
            Installer::Vanilla(i) => i,
            Installer::Spigot(i) => i,
            Installer::Papermc(i) => i,
            Installer::Forge(i) => i,
            Installer::Mohistmc(i) => i,
            Installer::Fabric(i) => i,
        }
    }

    pub fn server_id(&self) -> String {
        self.inner().server_id()
    }

    /// `libraries`, `eula.txt` and the distribution's own extras.
    pub fn secondary_files(&self) -> Vec<&'static str> {
        COMMON_SECONDARY_FILES
            .iter()
            .chain(self.inner().extra_files())
            .copied()
            .collect()
    }

    pub async fn is_materialized(&self, server_dir: &Path) -> bool {
        self.inner().is_materialized(server_dir).await
    }

    pub async fn materialize(
        &self,
        ctx: &InstallContext<'_>,
        server_dir: &Path,
        descriptor: VersionDescriptor,
    ) -> CoreResult<VersionDescriptor> {
        self.inner().materialize(ctx, server_dir, descriptor).await
    }
}

/// Download the descriptor's jar into `<server_dir>/version.jar`, checking
/// the recorded hash with `algorithm`.
pub(crate) async fn download_jar(
    ctx: &InstallContext<'_>,
    server_dir: &Path,
    descriptor: &VersionDescriptor,
    algorithm: HashAlgorithm,
) -> CoreResult<()> {
    let hash = descriptor
        .download
        .hash
        .as_ref()
        .map(|value| ExpectedHash::new(algorithm, value.clone()));
    ctx.store
        .download_to(&server_dir.join(SERVER_JAR), &descriptor.download.url, hash.as_ref())
        .await
}

pub(crate) fn absolute(path: &Path) -> CoreResult<PathBuf> {
    std::path::absolute(path).map_err(|e| CoreError::io(path, e))
}
