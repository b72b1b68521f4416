//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Database Settings ---
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "DATABASE_MAX_CONNECTIONS".to_string(),
                    format!("'{}' is not a positive integer", raw),
                )
            })?,
            None => 5,
        };

        Ok(Self {
            bind_address,
            database_url,
            database_max_connections,
            log_level,
            cors_origin,
        })
    }
}
