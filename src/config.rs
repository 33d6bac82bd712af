//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `WAITLIST_FILE` - Waitlist JSON file (default: waitlist.json)
//! - `AI_CONFIG_FILE` - AI configuration JSON file (default: ai_config.json)
//! - `INDEX_FILE` - HTML page served at `/` (default: static/index.html)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub waitlist_file: PathBuf,
    pub ai_config_file: PathBuf,
    pub index_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "0.0.0.0");
        let host = host
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar("HOST".to_string(), host.clone()))?;
        let port = var("PORT", "8080");
        let port = port
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar("PORT".to_string(), port.clone()))?;

        Ok(Self {
            host,
            port,
            waitlist_file: var("WAITLIST_FILE", "waitlist.json").into(),
            ai_config_file: var("AI_CONFIG_FILE", "ai_config.json").into(),
            index_file: var("INDEX_FILE", "static/index.html").into(),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.waitlist_file, PathBuf::from("waitlist.json"));
        assert_eq!(config.ai_config_file, PathBuf::from("ai_config.json"));
        assert_eq!(config.index_file, PathBuf::from("static/index.html"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("WAITLIST_FILE", "/data/wl.json"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.waitlist_file, PathBuf::from("/data/wl.json"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "PORT"));
    }
}
