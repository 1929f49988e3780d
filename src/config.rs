//! Application configuration loaded from environment variables.

use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;
use strum::{Display, EnumString};
use tracing_subscriber::EnvFilter;

use crate::error::{AppError, Result};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Deserialize)]
#[serde(try_from = "String")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    #[strum(serialize = "text", serialize = "TEXT", serialize = "pretty")]
    Text,
    /// One JSON object per line.
    #[strum(serialize = "json", serialize = "JSON")]
    Json,
}

impl TryFrom<String> for LogFormat {
    type Error = strum::ParseError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Address the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Responses ===
    /// Message returned by `GET /`.
    #[serde(default = "default_greeting")]
    pub greeting_message: String,

    // === Ambient Endpoints ===
    /// Serve Prometheus metrics at `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Serve the OpenAPI document at `/openapi.json`.
    #[serde(default = "default_true")]
    pub openapi_enabled: bool,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_greeting() -> String {
    "Hello, FastAPI!".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            greeting_message: default_greeting(),
            metrics_enabled: true,
            openapi_enabled: true,
            rust_log: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if self.greeting_message.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "GREETING_MESSAGE must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            AppError::InvalidConfig(format!("HOST must be an IP address, got {:?}", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Log filter built from `RUST_LOG`. `verbose` forces debug output for this crate.
    ///
    /// An unparsable level falls back to `info`.
    pub fn log_filter(&self, verbose: bool) -> EnvFilter {
        if verbose {
            return EnvFilter::new("autoroute=debug,info");
        }
        EnvFilter::try_new(&self.rust_log).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.greeting_message, "Hello, FastAPI!");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_greeting() {
        let config = Config {
            greeting_message: "   ".to_string(),
            ..Config::default()
        };

        match config.validate() {
            Err(AppError::InvalidConfig(msg)) => assert!(msg.contains("GREETING_MESSAGE")),
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn validate_rejects_hostname() {
        let config = Config {
            host: "localhost".to_string(),
            ..Config::default()
        };

        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));
        assert!(matches!(config.bind_addr(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn bind_addr_combines_host_and_port() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9090,
            ..Config::default()
        };

        assert_eq!(
            config.bind_addr().unwrap(),
            "127.0.0.1:9090".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn log_format_parses_case_variants() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn config_deserializes_from_env_pairs() {
        let vars = vec![
            ("PORT".to_string(), "9000".to_string()),
            ("LOG_FORMAT".to_string(), "json".to_string()),
            ("METRICS_ENABLED".to_string(), "false".to_string()),
        ];

        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.metrics_enabled);
        assert!(config.openapi_enabled);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn log_filter_uses_rust_log() {
        let config = Config {
            rust_log: "warn".to_string(),
            ..Config::default()
        };

        assert_eq!(config.log_filter(false).to_string(), "warn");
        assert!(config
            .log_filter(true)
            .to_string()
            .contains("autoroute=debug"));
    }

    #[test]
    fn log_filter_falls_back_on_bad_level() {
        let config = Config {
            rust_log: "autoroute=loudest".to_string(),
            ..Config::default()
        };

        assert_eq!(config.log_filter(false).to_string(), "info");
    }
}
