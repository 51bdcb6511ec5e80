//! API server configuration.
//!
//! Layered, lowest priority first:
//! 1. Built-in defaults
//! 2. TOML file named by `GRILL_CONFIG` (optional)
//! 3. `GRILL_*` environment variables
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! database_path = "./grill.db"
//! max_connections = 8
//! busy_timeout_secs = 5
//! stock_policy = "depleted_only"
//! track_finished_goods = false
//! ```

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use grill_core::StockPolicy;
use grill_db::{CheckoutOptions, DbConfig};
use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a stock transaction waits for the write lock
    pub busy_timeout_secs: u64,

    /// Which ingredient levels switch products off
    pub stock_policy: StockPolicy,

    /// Deduct finished-goods stock at checkout
    pub track_finished_goods: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_path: PathBuf::from("./grill.db"),
            max_connections: 8,
            busy_timeout_secs: 5,
            stock_policy: StockPolicy::default(),
            track_finished_goods: false,
        }
    }
}

impl ApiConfig {
    /// Loads defaults, then the `GRILL_CONFIG` file, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match env::var("GRILL_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => ApiConfig::default(),
        };
        config.with_overrides(|key| env::var(key).ok())
    }

    /// Reads a TOML file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `GRILL_*` overrides from `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("GRILL_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("GRILL_PORT") {
            self.port = parse("GRILL_PORT", &port)?;
        }
        if let Some(path) = lookup("GRILL_DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(max) = lookup("GRILL_MAX_CONNECTIONS") {
            self.max_connections = parse("GRILL_MAX_CONNECTIONS", &max)?;
        }
        if let Some(secs) = lookup("GRILL_BUSY_TIMEOUT_SECS") {
            self.busy_timeout_secs = parse("GRILL_BUSY_TIMEOUT_SECS", &secs)?;
        }
        if let Some(policy) = lookup("GRILL_STOCK_POLICY") {
            self.stock_policy = parse("GRILL_STOCK_POLICY", &policy)?;
        }
        if let Some(track) = lookup("GRILL_TRACK_FINISHED_GOODS") {
            self.track_finished_goods = parse("GRILL_TRACK_FINISHED_GOODS", &track)?;
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("GRILL_MAX_CONNECTIONS".to_string()));
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("GRILL_HOST".to_string()))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_secs(self.busy_timeout_secs))
    }

    pub fn checkout_options(&self) -> CheckoutOptions {
        CheckoutOptions::new(self.stock_policy, self.track_finished_goods)
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Cannot read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config file: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default().with_overrides(|_| None).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.stock_policy, StockPolicy::DepletedOnly);
        assert!(!config.track_finished_goods);
    }

    #[test]
    fn test_file_then_env() {
        let config = ApiConfig::from_toml(
            r#"
            port = 9000
            stock_policy = "low_or_depleted"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.stock_policy, StockPolicy::LowOrDepleted);

        let config = config
            .with_overrides(lookup(&[
                ("GRILL_PORT", "9100"),
                ("GRILL_TRACK_FINISHED_GOODS", "true"),
                ("GRILL_STOCK_POLICY", "depleted-only"),
            ]))
            .unwrap();
        assert_eq!(config.port, 9100);
        assert!(config.track_finished_goods);
        assert_eq!(config.stock_policy, StockPolicy::DepletedOnly);
    }

    #[test]
    fn test_invalid_values() {
        let err = ApiConfig::default()
            .with_overrides(lookup(&[("GRILL_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == "GRILL_PORT"));

        let err = ApiConfig::default()
            .with_overrides(lookup(&[("GRILL_MAX_CONNECTIONS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));

        assert!(ApiConfig::from_toml("port = \"x\"").is_err());
    }

    #[test]
    fn test_checkout_options() {
        let config = ApiConfig {
            stock_policy: StockPolicy::LowOrDepleted,
            track_finished_goods: true,
            ..ApiConfig::default()
        };
        let options = config.checkout_options();
        assert_eq!(options.stock_policy, StockPolicy::LowOrDepleted);
        assert!(options.track_finished_goods);
    }
}
