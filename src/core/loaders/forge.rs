use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::context::InstallContext;
use super::exec::ExecRequest;
use super::installer::{absolute, ServerInstaller};
use crate::core::descriptor::forge_args::{forge_descriptor, BAT_SCRIPT, SH_SCRIPT};
use crate::core::descriptor::{VersionDescriptor, SERVER_JAR};
use crate::core::error::{CoreError, CoreResult};
use crate::core::fsutil;
use crate::core::version::ForgeVersion;

const INSTALLER_JAR: &str = "installer.jar";
static FORGE_JAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(minecraft)?forge(-universal)?-[0-9.-]+(-mc\d+)?(-universal|-shim)?\.jar$")
        .expect("forge jar pattern")
});

/// Forge is produced by running its installer in the cache directory.
pub struct ForgeInstaller {
    version: ForgeVersion,
}

impl ForgeInstaller {
    pub fn new(version: ForgeVersion) -> Self {
        Self { version }
    }
}

#[async_trait]
impl ServerInstaller for ForgeInstaller {
    fn server_id(&self) -> String {
        format!("{}_{}", self.version.id, self.version.forge_version)
    }

    fn extra_files(&self) -> &'static [&'static str] {
        &[BAT_SCRIPT, SH_SCRIPT]
    }

    /// Newer installers leave launch scripts instead of a server jar.
    async fn is_materialized(&self, server_dir: &Path) -> bool {
        for name in [SERVER_JAR, BAT_SCRIPT, SH_SCRIPT] {
            if fsutil::exists(&server_dir.join(name)).await {
                return true;
            }
        }
        false
    }

    async fn materialize(
        &self,
        ctx: &InstallContext<'_>,
        server_dir: &Path,
        descriptor: VersionDescriptor,
    ) -> CoreResult<VersionDescriptor> {
        if !self.is_materialized(server_dir).await {
            let installer = server_dir.join(INSTALLER_JAR);
            ctx.store
                .download_to(&installer, &descriptor.download.url, None)
                .await?;

            info!("Running forge installer for {}", self.server_id());
            let request = ExecRequest {
                runtime: descriptor.runtime(),
                args: vec![
                    "-jar".to_string(),
                    absolute(&installer)?.to_string_lossy().into_owned(),
                    "--installServer".to_string(),
                ],
                current_dir: server_dir.to_path_buf(),
            };
            let id = self.server_id();
            ctx.exec
                .exec(request, &move |line: &str| debug!("[forge {}] {}", id, line))
                .await?;

            rename_installer_output(server_dir).await?;
        }

        forge_descriptor(server_dir, &descriptor).await
    }
}

/// Rename the installer's jar to `version.jar` and `run.{bat,sh}` to
/// `version.{bat,sh}`.
async fn rename_installer_output(server_dir: &Path) -> CoreResult<()> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(server_dir)
        .await
        .map_err(|e| CoreError::io(server_dir, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CoreError::io(server_dir, e))?
    {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    for name in names {
        let target = if FORGE_JAR.is_match(&name) {
            SERVER_JAR
        } else if name == "run.bat" {
            BAT_SCRIPT
        } else if name == "run.sh" {
            SH_SCRIPT
        } else {
            continue;
        };
        debug!("Renaming {} to {}", name, target);
        fsutil::move_path(&server_dir.join(&name), &server_dir.join(target)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forge_jar_names() {
        let re = &*FORGE_JAR;
        for name in [
            "forge-1.12.2-14.23.5.2859.jar",
            "minecraftforge-universal-1.6.4-9.11.1.1345.jar",
            "forge-1.7.10-10.13.4.1614-1.7.10-universal.jar",
            "forge-1.20.4-49.0.30-shim.jar",
        ] {
            assert!(re.is_match(name), "{}", name);
        }
        for name in ["installer.jar", "forge-1.20.1-47.2.0-installer.jar", "minecraft_server.1.12.2.jar"] {
            assert!(!re.is_match(name), "{}", name);
        }
    }
}
