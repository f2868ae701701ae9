pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::config::CoreConfig;
pub use crate::core::downloader::{Fetcher, HttpFetcher};
pub use crate::core::error::{CoreError, CoreResult, ErrorKind};
pub use crate::core::eula::EulaPrompt;
pub use crate::core::loaders::{ExecRequest, ExecRuntime, JavaCommand, ReadyServer};
pub use crate::core::manager::VersionManager;
pub use crate::core::version::{Distribution, Runtime, Version, VersionList};

/// Install the structured logging subscriber.
///
/// `RUST_LOG` overrides the default filter. Calling it twice is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mcserver_core=debug")),
        )
        .try_init();

    tracing::debug!("mcserver-core tracing initialized");
}
