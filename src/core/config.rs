use std::path::PathBuf;

const APP_DIR_NAME: &str = "McServerCore";
const DEFAULT_USER_AGENT: &str = "McServerCore/0.1.0";
const DEFAULT_FAN_OUT: usize = 8;

/// Runtime configuration of the version core.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Root of the version cache (`<cache>/<distribution>/...`).
    pub cache_dir: PathBuf,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Maximum number of in-flight per-id lookups during catalog fan-out.
    pub fan_out: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fan_out: DEFAULT_FAN_OUT,
        }
    }
}

impl CoreConfig {
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `MCSERVER_CACHE_DIR`, `MCSERVER_USER_AGENT`
    /// and `MCSERVER_FAN_OUT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("MCSERVER_CACHE_DIR") {
            if !dir.trim().is_empty() {
                config.cache_dir = PathBuf::from(dir);
            }
        }
        if let Ok(agent) = std::env::var("MCSERVER_USER_AGENT") {
            if !agent.trim().is_empty() {
                config.user_agent = agent;
            }
        }
        if let Ok(raw) = std::env::var("MCSERVER_FAN_OUT") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.fan_out = n,
                _ => tracing::warn!("Ignoring invalid MCSERVER_FAN_OUT={:?}", raw),
            }
        }

        config
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("versions")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cache_dir_ends_with_versions() {
        let config = CoreConfig::default();
        assert!(config.cache_dir.ends_with("versions"));
        assert_eq!(config.fan_out, DEFAULT_FAN_OUT);
    }

    #[test]
    fn with_cache_dir_keeps_other_defaults() {
        let config = CoreConfig::with_cache_dir("/srv/cache");
        assert_eq!(config.cache_dir, PathBuf::from("/srv/cache"));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }
}
