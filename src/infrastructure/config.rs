use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_SESSION_SECRET: &str = "dev-secret-change-me";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

/// Loads `.env` from the working directory or its parents into the process
/// environment. Variables already set win. Returns the file used, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

/// Same as [`load_dotenv`] for an explicit file.
pub fn load_dotenv_from(path: &Path) -> bool {
    dotenv::from_path(path).is_ok()
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub users_db_path: PathBuf,
    pub contacts_db_path: PathBuf,
    pub session_secret: String,
    pub session_ttl_secs: i64,
    pub secure_cookies: bool,
}

impl AppConfig {
    /// Reads the process environment. Call [`load_dotenv`] first so values
    /// from `.env` are visible here and to the log filter.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        if host.trim().is_empty() {
            return Err(ConfigError::Empty { key: "APP_HOST" });
        }

        let port = parse_or("APP_PORT", lookup("APP_PORT"), 8080u16)?;

        let users_db_path = lookup("USERS_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("database/users.db"));
        let contacts_db_path = lookup("CONTACTS_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("database/contacts.db"));

        let session_secret = match lookup("SESSION_SECRET") {
            Some(secret) if secret.is_empty() => {
                return Err(ConfigError::Empty {
                    key: "SESSION_SECRET",
                });
            }
            Some(secret) => secret,
            None => {
                warn!("SESSION_SECRET not set, using the development default");
                DEFAULT_SESSION_SECRET.to_string()
            }
        };

        let session_ttl_secs = parse_or("SESSION_TTL_SECS", lookup("SESSION_TTL_SECS"), 86_400i64)?;
        if session_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_SECS",
                value: session_ttl_secs.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let secure_cookies = parse_or("COOKIE_SECURE", lookup("COOKIE_SECURE"), false)?;

        Ok(Self {
            host,
            port,
            users_db_path,
            contacts_db_path,
            session_secret,
            session_ttl_secs,
            secure_cookies,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        }
    }
}
