//! Configuration management for the server.

use std::env;

/// Default request body limit (10 MiB).
const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Maximum accepted request body size in bytes
    pub body_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let body_limit = match env::var("BODY_LIMIT_BYTES") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidBodyLimit)?,
            Err(_) => DEFAULT_BODY_LIMIT,
        };

        Ok(Self {
            host,
            port,
            body_limit,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid BODY_LIMIT_BYTES value")]
    InvalidBodyLimit,
}
