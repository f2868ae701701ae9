// ─── Forge launch scripts ───
// Since 1.17 the Forge installer emits `run.bat`/`run.sh` instead of a
// server jar; the program arguments are lifted out of those scripts.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{launch_arguments, VersionDescriptor, SERVER_JAR};
use crate::core::error::{CoreError, CoreResult};

pub const BAT_SCRIPT: &str = "version.bat";
pub const SH_SCRIPT: &str = "version.sh";

static BAT_LAUNCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*java @user_jvm_args\.txt (.+) %\*\s*$").expect("bat launch pattern")
});
static SH_LAUNCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*java @user_jvm_args\.txt (.+) "\$@"\s*$"#).expect("sh launch pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Bat,
    Sh,
}

impl ScriptKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ScriptKind::Bat => BAT_SCRIPT,
            ScriptKind::Sh => SH_SCRIPT,
        }
    }

    /// Scripts to inspect, the one native to this OS first.
    pub fn search_order() -> [ScriptKind; 2] {
        if cfg!(windows) {
            [ScriptKind::Bat, ScriptKind::Sh]
        } else {
            [ScriptKind::Sh, ScriptKind::Bat]
        }
    }

    fn launch_line(self) -> &'static Regex {
        match self {
            ScriptKind::Bat => &*BAT_LAUNCH,
            ScriptKind::Sh => &*SH_LAUNCH,
        }
    }
}

/// Program arguments of the `java @user_jvm_args.txt ...` line, if any.
pub fn parse_script(kind: ScriptKind, text: &str) -> Option<Vec<String>> {
    let pattern = kind.launch_line();
    text.split('\n').find_map(|line| {
        pattern.captures(line).map(|c| {
            c[1].split(' ')
                .filter(|arg| !arg.is_empty())
                .map(str::to_string)
                .collect()
        })
    })
}

/// Rewrite `descriptor` after the installer ran in `server_dir`.
///
/// A launch script wins over a jar; with neither the build produced nothing.
pub async fn forge_descriptor(
    server_dir: &Path,
    descriptor: &VersionDescriptor,
) -> CoreResult<VersionDescriptor> {
    for kind in ScriptKind::search_order() {
        let path = server_dir.join(kind.file_name());
        let Ok(text) = tokio::fs::read_to_string(&path).await else {
            continue;
        };
        debug!("Reading forge launch script {:?}", path);
        let args = parse_script(kind, &text).ok_or_else(|| CoreError::MissingLaunchCommand(path.clone()))?;
        return Ok(VersionDescriptor {
            download: descriptor.download.clone(),
            java_version: descriptor.java_version.clone(),
            arguments: launch_arguments(args, false),
        });
    }

    let jar = server_dir.join(SERVER_JAR);
    if tokio::fs::try_exists(&jar).await.unwrap_or(false) {
        return Ok(descriptor.clone());
    }

    Err(CoreError::ArtifactNotFound {
        dir: server_dir.to_path_buf(),
        expected: format!("{}, {} or {}", SERVER_JAR, BAT_SCRIPT, SH_SCRIPT),
    })
}
