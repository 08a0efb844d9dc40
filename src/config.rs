//! Runtime configuration from environment variables (`.env` is loaded by the binary).

use crate::error::ConfigError;
use crate::query::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use std::net::SocketAddr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Insert sample rows into empty tables at startup.
    pub seed_sample_data: bool,
    pub default_per_page: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://entity_store.db".into(),
            max_connections: 5,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            seed_sample_data: true,
            default_per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults, malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);
        let max_connections = parse_or("MAX_CONNECTIONS", &lookup, defaults.max_connections)?.max(1);
        let bind_addr = parse_or("BIND_ADDR", &lookup, defaults.bind_addr)?;
        let seed_sample_data = match lookup("SEED_SAMPLE_DATA") {
            None => defaults.seed_sample_data,
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid {
                key: "SEED_SAMPLE_DATA",
                value: v,
            })?,
        };
        let default_per_page = parse_or("DEFAULT_PER_PAGE", &lookup, defaults.default_per_page)?.clamp(1, MAX_PER_PAGE);

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            seed_sample_data,
            default_per_page,
        })
    }
}

fn parse_or<T, F>(key: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite://entity_store.db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.seed_sample_data);
        assert_eq!(config.default_per_page, 5);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("MAX_CONNECTIONS", "2"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("SEED_SAMPLE_DATA", "off"),
            ("DEFAULT_PER_PAGE", "500"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert!(!config.seed_sample_data);
        assert_eq!(config.default_per_page, MAX_PER_PAGE);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = config_from(&[("MAX_CONNECTIONS", "many")]).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for MAX_CONNECTIONS: 'many'");
        assert!(config_from(&[("SEED_SAMPLE_DATA", "maybe")]).is_err());
    }
}
