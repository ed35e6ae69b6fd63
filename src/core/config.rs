//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.
//! Every setting except `JWT_SECRET` has a default; any value that is present
//! but unparseable is an error rather than a silent fallback.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::core::auth::jwt::{ACCESS_TOKEN_EXPIRATION_MINUTES, DEFAULT_ISSUER};
use crate::core::auth::password::{DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::core::auth::{JwtConfig, JwtError};
use crate::core::db::DbConfig;
use crate::core::db::pool::DEFAULT_DATABASE_URL;
use crate::core::notifications::DEFAULT_NOTIFICATION_DELAY;

/// Default listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

/// Default database pool size
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration errors; all of them are fatal at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable is not set")]
    MissingSecretKey,

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{0}")]
    Jwt(#[from] JwtError),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,

    /// SQLite connection settings
    pub database: DbConfig,

    /// Token signing settings (the secret is redacted from Debug output)
    pub jwt: JwtConfig,

    /// bcrypt work factor
    pub bcrypt_cost: u32,

    /// Simulated delivery delay for notifications
    pub notification_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecretKey)?;

        let expiration: i64 = parse_or(
            &lookup,
            "JWT_ACCESS_EXPIRATION_MINUTES",
            ACCESS_TOKEN_EXPIRATION_MINUTES,
        )?;
        let issuer = lookup("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string());

        let jwt = JwtConfig::new(secret)
            .access_token_expiration(expiration)
            .issuer(issuer)
            .validated()?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let max_connections: u32 =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DATABASE_MAX_CONNECTIONS",
                value: max_connections.to_string(),
            });
        }

        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                name: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(value) => parse_value("LISTEN_ADDR", value)?,
            None => SocketAddr::from_str(DEFAULT_LISTEN_ADDR).map_err(|_| {
                ConfigError::InvalidValue {
                    name: "LISTEN_ADDR",
                    value: DEFAULT_LISTEN_ADDR.to_string(),
                }
            })?,
        };

        let notification_delay = Duration::from_secs(parse_or(
            &lookup,
            "NOTIFICATION_DELAY_SECS",
            DEFAULT_NOTIFICATION_DELAY.as_secs(),
        )?);

        Ok(Self {
            listen_addr,
            database: DbConfig::new(database_url).max_connections(max_connections),
            jwt,
            bcrypt_cost,
            notification_delay,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => parse_value(name, value),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_with_only_secret() {
        let config = load(&[("JWT_SECRET", "test-secret")]).unwrap();

        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:8000");
        assert_eq!(config.database.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.access_token_expiration_minutes, 30);
        assert_eq!(config.jwt.issuer, "todo-api");
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.notification_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingSecretKey)));
        assert!(matches!(
            load(&[("JWT_SECRET", "   ")]),
            Err(ConfigError::MissingSecretKey)
        ));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("JWT_SECRET", "s"),
            ("JWT_ACCESS_EXPIRATION_MINUTES", "5"),
            ("JWT_ISSUER", "other"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
            ("BCRYPT_COST", "4"),
            ("LISTEN_ADDR", "0.0.0.0:9000"),
            ("NOTIFICATION_DELAY_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.jwt.access_token_expiration_minutes, 5);
        assert_eq!(config.jwt.issuer, "other");
        assert_eq!(config.database.database_url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.notification_delay, Duration::ZERO);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (name, value) in [
            ("JWT_ACCESS_EXPIRATION_MINUTES", "soon"),
            ("BCRYPT_COST", "3"),
            ("BCRYPT_COST", "32"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
            ("LISTEN_ADDR", "localhost"),
            ("NOTIFICATION_DELAY_SECS", "-1"),
        ] {
            let result = load(&[("JWT_SECRET", "s"), (name, value)]);
            assert!(
                matches!(result, Err(ConfigError::InvalidValue { .. })),
                "{name}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_non_positive_expiration_is_rejected() {
        let result = load(&[("JWT_SECRET", "s"), ("JWT_ACCESS_EXPIRATION_MINUTES", "0")]);
        assert!(matches!(
            result,
            Err(ConfigError::Jwt(JwtError::InvalidExpiration(0)))
        ));
    }

    #[test]
    fn test_huge_expiration_is_rejected_at_load() {
        let result = load(&[
            ("JWT_SECRET", "s"),
            ("JWT_ACCESS_EXPIRATION_MINUTES", "9223372036854775807"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::Jwt(JwtError::InvalidExpiration(i64::MAX)))
        ));
    }

    #[test]
    fn test_config_debug_hides_secret() {
        let config = load(&[("JWT_SECRET", "super-secret-key-123")]).unwrap();
        let debug_str = format!("{:?}", config);

        assert!(debug_str.contains("Config"));
        assert!(!debug_str.contains("super-secret-key-123"));
    }
}
