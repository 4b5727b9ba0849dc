//! Service configuration
//!
//! Read from environment variables (after `.env`, if present). The rule
//! catalog is loaded once at start-up from `FAC_CATALOG_PATH` or the built-in
//! table; it is not reloaded while running.
//!
//! | Variable | Default |
//! |---|---|
//! | `FAC_HOST` | `0.0.0.0` |
//! | `FAC_PORT` (falls back to `PORT`) | `5000` |
//! | `FAC_CATALOG_PATH` | built-in catalog |
//! | `FAC_EXTRACTOR_URL` | none: only inline facts are accepted |
//! | `FAC_EXTRACTOR_TIMEOUT_SECS` | `300` |

use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_EXTRACTOR_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub catalog_path: Option<PathBuf>,
    pub extractor_url: Option<String>,
    pub extractor_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            catalog_path: None,
            extractor_url: None,
            extractor_timeout: Duration::from_secs(DEFAULT_EXTRACTOR_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("FAC_HOST") {
            config.host = host;
        }

        if let Some(port) = get("FAC_PORT").or_else(|| get("PORT")) {
            config.port = port.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "FAC_PORT",
                value: port.clone(),
                reason: format!("{e}"),
            })?;
        }

        config.catalog_path = get("FAC_CATALOG_PATH").map(PathBuf::from);

        if let Some(url) = get("FAC_EXTRACTOR_URL") {
            Url::parse(&url).map_err(|e| ConfigError::InvalidValue {
                key: "FAC_EXTRACTOR_URL",
                value: url.clone(),
                reason: e.to_string(),
            })?;
            config.extractor_url = Some(url);
        }

        if let Some(secs) = get("FAC_EXTRACTOR_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "FAC_EXTRACTOR_TIMEOUT_SECS",
                value: secs.clone(),
                reason: format!("{e}"),
            })?;
            config.extractor_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Socket address string to bind the HTTP listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
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
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.extractor_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("FAC_HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("FAC_CATALOG_PATH", "/etc/fac/catalog.yaml"),
            ("FAC_EXTRACTOR_URL", "http://extractor:8000"),
            ("FAC_EXTRACTOR_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/fac/catalog.yaml"))
        );
        assert_eq!(config.extractor_url.as_deref(), Some("http://extractor:8000"));
        assert_eq!(config.extractor_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_fac_port_wins_over_port() {
        let config =
            ServiceConfig::from_lookup(lookup(&[("FAC_PORT", "9000"), ("PORT", "8080")])).unwrap();
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = ServiceConfig::from_lookup(lookup(&[("FAC_EXTRACTOR_URL", "  ")])).unwrap();
        assert_eq!(config.extractor_url, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ServiceConfig::from_lookup(lookup(&[("FAC_PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("FAC_PORT"));

        let err = ServiceConfig::from_lookup(lookup(&[("FAC_EXTRACTOR_URL", "not a url")]))
            .unwrap_err();
        assert!(err.to_string().contains("FAC_EXTRACTOR_URL"));
    }
}
