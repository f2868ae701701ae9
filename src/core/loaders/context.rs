use std::path::Path;

use super::exec::ExecRuntime;
use crate::core::downloader::ContentStore;
use crate::core::version::ManifestResolver;

/// Everything an install or uninstall step touches.
pub struct InstallContext<'a> {
    pub store: &'a ContentStore,
    pub manifest: &'a ManifestResolver,
    pub cache_dir: &'a Path,
    pub exec: &'a dyn ExecRuntime,
}
