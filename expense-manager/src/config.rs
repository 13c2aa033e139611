//! Runtime configuration, read from the environment (and `.env` via `dotenvy`).

use std::env;
use std::net::SocketAddr;

use chrono::TimeDelta;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://./expense_manager.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_HASH_ITERATIONS: u32 = 100_000;
pub const MIN_HASH_ITERATIONS: u32 = 1_000;
const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const MIN_SESSION_TTL_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub password_hash_iterations: u32,
    /// Marks the session cookie `Secure`; enable behind HTTPS.
    pub session_cookie_secure: bool,
    /// Lifetime of a login session, counted from login.
    pub session_ttl: TimeDelta,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = parse_or(
            "BIND_ADDR",
            lookup("BIND_ADDR"),
            SocketAddr::from(([127, 0, 0, 1], 3000)),
        )?;

        let db_max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            lookup("DB_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let password_hash_iterations = parse_or(
            "PASSWORD_HASH_ITERATIONS",
            lookup("PASSWORD_HASH_ITERATIONS"),
            DEFAULT_HASH_ITERATIONS,
        )?;
        if password_hash_iterations < MIN_HASH_ITERATIONS {
            return Err(ConfigError::Invalid {
                key: "PASSWORD_HASH_ITERATIONS",
                value: password_hash_iterations.to_string(),
                reason: format!("must be at least {MIN_HASH_ITERATIONS}"),
            });
        }

        let session_cookie_secure = match lookup("SESSION_COOKIE_SECURE") {
            None => false,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SESSION_COOKIE_SECURE",
                        value,
                        reason: "expected a boolean".to_string(),
                    })
                }
            },
        };

        let ttl_secs = parse_or(
            "SESSION_TTL_SECS",
            lookup("SESSION_TTL_SECS"),
            DEFAULT_SESSION_TTL_SECS,
        )?;
        let session_ttl = TimeDelta::try_seconds(ttl_secs)
            .filter(|_| ttl_secs >= MIN_SESSION_TTL_SECS)
            .ok_or_else(|| ConfigError::Invalid {
                key: "SESSION_TTL_SECS",
                value: ttl_secs.to_string(),
                reason: format!("must be at least {MIN_SESSION_TTL_SECS} seconds"),
            })?;

        Ok(Self {
            database_url,
            bind_addr,
            db_max_connections,
            password_hash_iterations,
            session_cookie_secure,
            session_ttl,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
