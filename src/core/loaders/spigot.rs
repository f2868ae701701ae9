use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use super::context::InstallContext;
use super::exec::ExecRequest;
use super::installer::{absolute, ServerInstaller};
use crate::core::descriptor::{VersionDescriptor, FILE_ENCODING_ARG, SERVER_JAR};
use crate::core::error::{CoreError, CoreResult};
use crate::core::fsutil;
use crate::core::version::SpigotVersion;

const BUILD_DIR: &str = "build";
const BUILD_TOOLS_JAR: &str = "BuildTools.jar";

/// Spigot is compiled locally with BuildTools.
pub struct SpigotInstaller {
    version: SpigotVersion,
}

impl SpigotInstaller {
    pub fn new(version: SpigotVersion) -> Self {
        Self { version }
    }
}

#[async_trait]
impl ServerInstaller for SpigotInstaller {
    fn server_id(&self) -> String {
        self.version.id.clone()
    }

    fn extra_files(&self) -> &'static [&'static str] {
        &["bundler"]
    }

    async fn materialize(
        &self,
        ctx: &InstallContext<'_>,
        server_dir: &Path,
        descriptor: VersionDescriptor,
    ) -> CoreResult<VersionDescriptor> {
        let jar = server_dir.join(SERVER_JAR);
        if fsutil::exists(&jar).await {
            return Ok(descriptor);
        }

        let build_dir = server_dir.join(BUILD_DIR);
        let build_tools = build_dir.join(BUILD_TOOLS_JAR);
        // BuildTools is a rolling artifact without a published digest
        ctx.store
            .download_to(&build_tools, &descriptor.download.url, None)
            .await?;

        info!("Building spigot {} with BuildTools", self.version.id);
        let request = ExecRequest {
            runtime: descriptor.runtime(),
            args: vec![
                FILE_ENCODING_ARG.to_string(),
                "-jar".to_string(),
                absolute(&build_tools)?.to_string_lossy().into_owned(),
                "--rev".to_string(),
                self.version.id.clone(),
            ],
            current_dir: build_dir.clone(),
        };
        let id = self.version.id.clone();
        ctx.exec
            .exec(request, &move |line: &str| debug!("[spigot {}] {}", id, line))
            .await?;

        let built = build_dir.join(format!("spigot-{}.jar", self.version.id));
        if !fsutil::exists(&built).await {
            return Err(CoreError::ArtifactNotFound {
                dir: build_dir,
                expected: format!("spigot-{}.jar", self.version.id),
            });
        }
        fsutil::move_path(&built, &jar).await?;
        fsutil::remove_path(&build_dir).await?;

        Ok(descriptor)
    }
}
