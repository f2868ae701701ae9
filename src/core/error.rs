use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the server version core.
/// Every module returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("{algorithm} mismatch for {url}: expected {expected}, got {actual}")]
    HashMismatch {
        url: String,
        algorithm: &'static str,
        expected: String,
        actual: String,
    },

    // ── Parsing ─────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected page layout at {url}: {reason}")]
    Markup { url: String, reason: String },

    // ── Structure ───────────────────────────────────────
    #[error("Version {0} is not listed in the vanilla manifest")]
    NotInManifest(String),

    #[error("Version {0} does not provide a server jar")]
    NoServerDownload(String),

    #[error("Build step produced no {expected} in {dir:?}")]
    ArtifactNotFound { dir: PathBuf, expected: String },

    #[error("No java command found in launch script {0:?}")]
    MissingLaunchCommand(PathBuf),

    // ── External build ──────────────────────────────────
    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    // ── License ─────────────────────────────────────────
    #[error("Minecraft EULA ({url}) was not accepted")]
    EulaDeclined { url: String },
}

/// Convenience alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;

/// Coarse classification callers use to decide what to do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, integrity, parse and filesystem failures. Re-invoking the
    /// same call may succeed.
    Transport,
    /// An expected file, pattern or manifest entry is missing.
    Structural,
    /// The server was installed but its license was refused.
    EulaDeclined,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        self == ErrorKind::Transport
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Io { .. }
            | CoreError::Http(_)
            | CoreError::DownloadFailed { .. }
            | CoreError::HashMismatch { .. }
            | CoreError::Json(_)
            | CoreError::Markup { .. }
            | CoreError::JavaExecution(_) => ErrorKind::Transport,
            CoreError::NotInManifest(_)
            | CoreError::NoServerDownload(_)
            | CoreError::ArtifactNotFound { .. }
            | CoreError::MissingLaunchCommand(_) => ErrorKind::Structural,
            CoreError::EulaDeclined { .. } => ErrorKind::EulaDeclined,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn markup(url: &str, reason: impl Into<String>) -> Self {
        CoreError::Markup {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(source: std::io::Error) -> Self {
        CoreError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

// ── Serialization for IPC front-ends ────────────────────
// Front-ends receive the message only.
impl serde::Serialize for CoreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
