//! Database configuration module.
//!
//! Provides configuration structures for database connection management.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,

    /// Upper bound for a single repository call in seconds
    pub query_timeout_secs: u64,
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl DatabaseConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `DATABASE_URL`: PostgreSQL connection string (required)
    /// - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 10)
    /// - `DB_MIN_CONNECTIONS`: Minimum pool size (default: 1)
    /// - `DB_CONNECTION_TIMEOUT`: Connection timeout in seconds (default: 10)
    /// - `DB_IDLE_TIMEOUT`: Idle timeout in seconds (default: 600)
    /// - `DB_MAX_LIFETIME`: Max lifetime in seconds (default: 1800)
    /// - `DB_QUERY_TIMEOUT`: Per-call timeout in seconds (default: 5)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `DATABASE_URL` is not set, a value does not
    /// parse, or the pool bounds are contradictory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "e.g. postgres://postgres@localhost/tournament".to_string(),
        })?;

        let config = Self {
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 10)?,
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", 1)?,
            connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT", 10)?,
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT", 600)?,
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME", 1800)?,
            query_timeout_secs: parse_env_or("DB_QUERY_TIMEOUT", 5)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a `.env` file if one exists, then read the environment
    pub fn from_env_file() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Create a default configuration for development
    ///
    /// Uses `postgres://postgres@localhost/tournament` as the database URL
    pub fn development() -> Self {
        Self {
            database_url: "postgres://postgres@localhost/tournament".to_string(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            query_timeout_secs: 5,
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Must not exceed max connections ({})",
                    self.max_connections
                ),
            });
        }

        if self.query_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_QUERY_TIMEOUT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Per-call timeout as a `Duration`
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Could not parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}
