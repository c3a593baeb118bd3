pub mod database;

use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `RISKLEDGER_PORT=9000`.
pub const ENV_PREFIX: &str = "RISKLEDGER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub static_dir: String,
    pub seed_defaults: bool,
    pub log_format: LogFormat,
    pub default_page_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://risk_management.db?mode=rwc".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_connections: 5,
            acquire_timeout_secs: 5,
            static_dir: "static".to_string(),
            seed_defaults: true,
            log_format: LogFormat::Pretty,
            default_page_size: 100,
        }
    }
}

impl Config {
    /// Defaults overridden by `RISKLEDGER_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::load(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Defaults overridden by an arbitrary configuration source.
    pub fn load<S>(source: S) -> anyhow::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(source)
            .build()?;

        settings
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = Config::load(env(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.database_url, "sqlite://risk_management.db?mode=rwc");
        assert!(config.seed_defaults);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::load(env(&[
            ("RISKLEDGER_PORT", "9100"),
            ("RISKLEDGER_SEED_DEFAULTS", "false"),
            ("RISKLEDGER_LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9100);
        assert!(!config.seed_defaults);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.bind_address(), "0.0.0.0:9100");
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let result = Config::load(env(&[("RISKLEDGER_PORT", "not-a-port")]));
        assert!(result.is_err());
    }
}
