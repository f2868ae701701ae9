// ─── Install / Uninstall ───
// The lifecycle every distribution shares:
//   describe -> materialize -> stage -> log4j patch -> EULA -> ready
// and its inverse, which parks the server files back in the cache.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use super::context::InstallContext;
use super::installer::{absolute, Installer};
use super::log4j::{self, CONFIG_FILES};
use crate::core::descriptor::{
    generate_version_json, render, server_dir, EmbedValues, JarArg, VersionDescriptor,
    DESCRIPTOR_FILE, SERVER_JAR,
};
use crate::core::error::CoreResult;
use crate::core::eula::{ensure_agreement, EulaPrompt};
use crate::core::fsutil;
use crate::core::version::{Runtime, Version};

/// A staged server, ready to be launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyServer {
    pub runtime: Runtime,
    pub arguments: Vec<JarArg>,
    pub jar_path: PathBuf,
    pub log4j_arg: Option<String>,
}

impl ReadyServer {
    /// The java argument list with `jvm_args` spliced in.
    pub fn command(&self, jvm_args: &[String]) -> Vec<String> {
        let jar_path = self.jar_path.to_string_lossy();
        render(
            &self.arguments,
            &EmbedValues {
                jvm: jvm_args,
                jar_path: &jar_path,
                log4j: self.log4j_arg.as_deref(),
            },
        )
    }
}

/// Make `version` runnable in `workdir`.
pub async fn install(
    ctx: &InstallContext<'_>,
    version: &Version,
    workdir: &Path,
    prompt: &dyn EulaPrompt,
) -> CoreResult<ReadyServer> {
    let installer = Installer::new(version);
    let server_id = installer.server_id();
    let server_dir = server_dir(ctx.cache_dir, version.distribution(), &server_id);
    info!("Installing {} {} into {:?}", version.distribution(), server_id, workdir);

    // Describe + materialize
    let descriptor = ready_cache(ctx, version, &installer, &server_dir).await?;

    // Stage
    fsutil::ensure_dir(workdir).await?;
    let mut staged = vec![SERVER_JAR];
    staged.extend(installer.secondary_files());
    for name in staged {
        if fsutil::copy_path(&server_dir.join(name), &workdir.join(name)).await? {
            debug!("Staged {}", name);
        }
    }

    // Log4j
    let manifest = ctx.manifest.get_manifest(true).await?;
    let patch = log4j::patch_for(&manifest, version.id());
    if let Some(config) = patch.as_ref().and_then(|p| p.config) {
        let cached = server_dir.join(config.file_name);
        ctx.store.download_to(&cached, config.url, None).await?;
        fsutil::copy_path(&cached, &workdir.join(config.file_name)).await?;
    }

    // EULA
    ensure_agreement(workdir, prompt).await?;

    info!("{} {} is ready", version.distribution(), server_id);
    Ok(ReadyServer {
        runtime: descriptor.runtime(),
        arguments: descriptor.arguments,
        jar_path: absolute(&workdir.join(SERVER_JAR))?,
        log4j_arg: patch.map(|p| p.arg),
    })
}

/// Reuse the cached descriptor and artifact, or rebuild both.
///
/// The descriptor is written only once its artifact exists, so a present
/// descriptor with a missing artifact means an interrupted or wiped cache.
async fn ready_cache(
    ctx: &InstallContext<'_>,
    version: &Version,
    installer: &Installer,
    server_dir: &Path,
) -> CoreResult<VersionDescriptor> {
    let path = server_dir.join(DESCRIPTOR_FILE);

    if let Some(descriptor) = VersionDescriptor::read(&path).await {
        if installer.is_materialized(server_dir).await {
            debug!("Cache hit for {:?}", server_dir);
            return Ok(descriptor);
        }
        debug!("Descriptor {:?} has no artifact, regenerating", path);
    }

    let generated = generate_version_json(ctx.store, ctx.manifest, version).await?;
    let descriptor = installer.materialize(ctx, server_dir, generated).await?;
    descriptor.write(&path).await?;
    Ok(descriptor)
}

/// Move the server files of `version` out of `workdir` into the cache.
/// Cache contents are overwritten, never deleted.
pub async fn uninstall(cache_dir: &Path, version: &Version, workdir: &Path) -> CoreResult<()> {
    let installer = Installer::new(version);
    let server_dir = server_dir(cache_dir, version.distribution(), &installer.server_id());
    info!("Uninstalling {} {} from {:?}", version.distribution(), installer.server_id(), workdir);

    let mut names = vec![SERVER_JAR];
    names.extend(CONFIG_FILES.iter().map(|c| c.file_name));
    names.extend(installer.secondary_files());

    let mut moved = Vec::new();
    for name in names {
        let source = workdir.join(name);
        if fsutil::copy_path(&source, &server_dir.join(name)).await? {
            moved.push(source);
        }
    }
    for source in moved {
        fsutil::remove_path(&source).await?;
    }
    Ok(())
}
