pub mod context;
pub mod engine;
pub mod exec;
pub mod fabric;
pub mod forge;
pub mod installer;
pub mod log4j;
pub mod mohistmc;
pub mod papermc;
pub mod spigot;
pub mod vanilla;

pub use context::InstallContext;
pub use engine::{install, uninstall, ReadyServer};
pub use exec::{ExecRequest, ExecRuntime, JavaCommand, LineSink};
pub use installer::{Installer, ServerInstaller};
