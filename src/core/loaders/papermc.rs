use std::path::Path;

use async_trait::async_trait;

use super::context::InstallContext;
use super::installer::{download_jar, ServerInstaller};
use crate::core::descriptor::VersionDescriptor;
use crate::core::downloader::HashAlgorithm;
use crate::core::error::CoreResult;
use crate::core::version::PapermcVersion;

pub struct PapermcInstaller {
    version: PapermcVersion,
}

impl PapermcInstaller {
    pub fn new(version: PapermcVersion) -> Self {
        Self { version }
    }
}

#[async_trait]
impl ServerInstaller for PapermcInstaller {
    fn server_id(&self) -> String {
        format!("{}_{}", self.version.id, self.version.build)
    }

    async fn materialize(
        &self,
        ctx: &InstallContext<'_>,
        server_dir: &Path,
        descriptor: VersionDescriptor,
    ) -> CoreResult<VersionDescriptor> {
        download_jar(ctx, server_dir, &descriptor, HashAlgorithm::Sha256).await?;
        Ok(descriptor)
    }
}
