//! Configuration loading and representation.
//!
//! Values come from the process environment; a `.env` file in the working
//! directory is loaded first when present. Empty variables count as unset.

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use stockroom_inventory::StockPolicy;

use crate::store::DEFAULT_STORAGE_TIMEOUT;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(14 * 60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Periodic self-ping that keeps an idle host awake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAliveConfig {
    pub url: String,
    pub interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub storage_timeout: Duration,
    pub stock_policy: StockPolicy,
    pub keep_alive: Option<KeepAliveConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
            stock_policy: StockPolicy::unbounded(),
            keep_alive: None,
        }
    }
}

impl AppConfig {
    /// Load from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = parse_var(&get, "PORT")?.unwrap_or(defaults.port);
        let database_max_connections = parse_var(&get, "DATABASE_MAX_CONNECTIONS")?
            .unwrap_or(defaults.database_max_connections);
        if database_max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DATABASE_MAX_CONNECTIONS",
                reason: "must be at least 1".to_string(),
            });
        }

        let storage_timeout = parse_var::<u64, _>(&get, "STORAGE_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.storage_timeout);
        if storage_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "STORAGE_TIMEOUT_MS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let stock_policy = match parse_var::<Decimal, _>(&get, "STOCK_FLOOR")? {
            Some(floor) => StockPolicy::with_floor(floor),
            None => StockPolicy::unbounded(),
        };

        let keep_alive = match get("KEEP_ALIVE_URL") {
            Some(url) => {
                let interval = parse_var::<u64, _>(&get, "KEEP_ALIVE_INTERVAL_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_KEEP_ALIVE_INTERVAL);
                if interval.is_zero() {
                    return Err(ConfigError::Invalid {
                        var: "KEEP_ALIVE_INTERVAL_SECS",
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Some(KeepAliveConfig { url, interval })
            }
            None => None,
        };

        Ok(Self {
            port,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            storage_timeout,
            stock_policy,
            keep_alive,
        })
    }
}

fn parse_var<T, G>(get: &G, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: format!("{raw:?}: {e}"),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal_macros::dec;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        assert_eq!(load(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let cfg = load(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/stock"),
            ("DATABASE_MAX_CONNECTIONS", "10"),
            ("STORAGE_TIMEOUT_MS", "250"),
            ("STOCK_FLOOR", "0"),
            ("KEEP_ALIVE_URL", "https://example.test/ping"),
            ("KEEP_ALIVE_INTERVAL_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/stock"));
        assert_eq!(cfg.database_max_connections, 10);
        assert_eq!(cfg.storage_timeout, Duration::from_millis(250));
        assert_eq!(cfg.stock_policy, StockPolicy::with_floor(dec!(0)));
        assert_eq!(
            cfg.keep_alive,
            Some(KeepAliveConfig {
                url: "https://example.test/ping".to_string(),
                interval: Duration::from_secs(60),
            })
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = load(&[("DATABASE_URL", "  "), ("KEEP_ALIVE_URL", "")]).unwrap();
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.keep_alive, None);
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));

        let err = load(&[("STOCK_FLOOR", "none")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "STOCK_FLOOR", .. }));

        let err = load(&[("STORAGE_TIMEOUT_MS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "STORAGE_TIMEOUT_MS", .. }));
    }
}
