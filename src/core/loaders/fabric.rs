use std::path::Path;

use async_trait::async_trait;

use super::context::InstallContext;
use super::installer::ServerInstaller;
use crate::core::descriptor::{VersionDescriptor, SERVER_JAR};
use crate::core::error::CoreResult;
use crate::core::version::FabricVersion;

/// Fabric's meta server assembles a launcher jar on request; it publishes
/// no digest for it.
pub struct FabricInstaller {
    version: FabricVersion,
}

impl FabricInstaller {
    pub fn new(version: FabricVersion) -> Self {
        Self { version }
    }
}

#[async_trait]
impl ServerInstaller for FabricInstaller {
    fn server_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.version.id, self.version.loader, self.version.installer
        )
    }

    async fn materialize(
        &self,
        ctx: &InstallContext<'_>,
        server_dir: &Path,
        descriptor: VersionDescriptor,
    ) -> CoreResult<VersionDescriptor> {
        ctx.store
            .download_to(&server_dir.join(SERVER_JAR), &descriptor.download.url, None)
            .await?;
        Ok(descriptor)
    }
}
