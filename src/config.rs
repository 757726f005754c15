//! Configuration management for the manuals server

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Storage endpoint used when `PDF_BASE_URL` is not set.
pub const DEFAULT_PDF_BASE_URL: &str = "https://tansihondamanuals.t3.storage.dev";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Public base URL of the object-storage bucket holding the manuals
    pub base_url: String,
    /// TCP connect timeout for upstream requests, in seconds
    pub connect_timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            upstream: UpstreamConfig {
                base_url: DEFAULT_PDF_BASE_URL.to_string(),
                connect_timeout_secs: 10,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("SERVER_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("SERVER_PORT", raw))?,
            Err(_) => 3000,
        };

        let connect_timeout_secs = match env::var("UPSTREAM_CONNECT_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("UPSTREAM_CONNECT_TIMEOUT_SECS", raw))?,
            Err(_) => 10,
        };

        let base_url = env::var("PDF_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PDF_BASE_URL.to_string());

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
            },
            upstream: UpstreamConfig {
                base_url,
                connect_timeout_secs,
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
