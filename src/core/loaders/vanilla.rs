use std::path::Path;

use async_trait::async_trait;

use super::context::InstallContext;
use super::installer::{download_jar, ServerInstaller};
use crate::core::descriptor::VersionDescriptor;
use crate::core::downloader::HashAlgorithm;
use crate::core::error::CoreResult;
use crate::core::version::VanillaVersion;

pub struct VanillaInstaller {
    version: VanillaVersion,
}

impl VanillaInstaller {
    pub fn new(version: VanillaVersion) -> Self {
        Self { version }
    }
}

#[async_trait]
impl ServerInstaller for VanillaInstaller {
    fn server_id(&self) -> String {
        self.version.id.clone()
    }

    async fn materialize(
        &self,
        ctx: &InstallContext<'_>,
        server_dir: &Path,
        descriptor: VersionDescriptor,
    ) -> CoreResult<VersionDescriptor> {
        download_jar(ctx, server_dir, &descriptor, HashAlgorithm::Sha1).await?;
        Ok(descriptor)
    }
}
