//! Environment-driven configuration.
//!
//! The server fails fast on startup when required settings are missing so
//! misconfiguration is caught at deploy time, not on the first request.

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,

    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Maximum database connections in the pool.
    pub max_connections: u32,

    /// HMAC secret for bearer token verification.
    pub jwt_secret: String,

    /// Capacity of the lifecycle event channel.
    pub event_channel_capacity: usize,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < 32 {
            tracing::warn!("JWT_SECRET is shorter than 32 bytes; use a stronger secret");
        }

        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", DEFAULT_PORT)?;
        let max_connections = parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let event_channel_capacity = parse_or("EVENT_CHANNEL_CAPACITY", DEFAULT_EVENT_CAPACITY)?;

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            jwt_secret,
            event_channel_capacity,
        })
    }

    /// The socket address to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let port: u16 = parse_or("HOTS_TEST_UNSET_PORT", 9999).unwrap();
        assert_eq!(port, 9999);
    }
}
