//! Server configuration loaded from the environment.
//!
//! # Invariants
//! - A missing API key is allowed at startup but rejects every core request.
//! - The key value itself is never logged or echoed.

use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "lexicon.sqlite3";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Shared secret expected in `X-API-Key`.
    pub api_key: Option<String>,
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr when `None`.
    pub log_dir: Option<String>,
}

impl ServerConfig {
    /// Loads configuration from `LEXICON_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr_text =
            read("LEXICON_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_text.parse().map_err(|err| {
            anyhow::anyhow!("LEXICON_BIND_ADDR `{bind_addr_text}` is not a socket address: {err}")
        })?;

        Ok(Self {
            api_key: read("LEXICON_API_KEY"),
            db_path: read("LEXICON_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            bind_addr,
            log_level: read("LEXICON_LOG_LEVEL")
                .unwrap_or_else(|| lexicon_core::default_log_level().to_string()),
            log_dir: read("LEXICON_LOG_DIR"),
        })
    }

}

#[cfg(test)]
mod tests {
    use super::{ServerConfig, DEFAULT_BIND_ADDR, DEFAULT_DB_PATH};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("LEXICON_API_KEY", "   "), ("LEXICON_LOG_DIR", "")]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn values_are_read_and_trimmed() {
        let config = config_from(&[
            ("LEXICON_API_KEY", " secret "),
            ("LEXICON_DB_PATH", "/var/lib/lexicon.db"),
            ("LEXICON_BIND_ADDR", "0.0.0.0:9000"),
            ("LEXICON_LOG_LEVEL", "warn"),
        ])
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.db_path, PathBuf::from("/var/lib/lexicon.db"));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let err = config_from(&[("LEXICON_BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(err.to_string().contains("LEXICON_BIND_ADDR"));
    }
}
