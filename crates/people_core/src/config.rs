//! Store configuration loaded from the process environment.
//!
//! # Responsibility
//! - Resolve the one connection string the people store needs.
//! - Load an optional `.env` file before reading the environment.
//!
//! # Invariants
//! - A `StoreConfig` never carries a blank connection string.

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Environment variable holding the store connection string.
pub const CONNECTION_STRING_VAR: &str = "PEOPLE_DB_URI";

/// Configuration errors surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is not set.
    Missing(&'static str),
    /// Variable is set but empty after trimming.
    Blank(&'static str),
    /// `.env` file cannot be read or parsed.
    EnvFile(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "environment variable `{var}` is not set"),
            Self::Blank(var) => write!(f, "environment variable `{var}` is blank"),
            Self::EnvFile(message) => write!(f, "failed to read env file: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Connection settings for the people store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    connection_string: String,
}

impl StoreConfig {
    /// Builds a config from an explicit connection string.
    pub fn new(connection_string: impl Into<String>) -> Result<Self, ConfigError> {
        let connection_string = connection_string.into();
        if connection_string.trim().is_empty() {
            return Err(ConfigError::Blank(CONNECTION_STRING_VAR));
        }
        Ok(Self {
            connection_string: connection_string.trim().to_string(),
        })
    }

    /// Config pointing at a private in-memory store.
    pub fn in_memory() -> Self {
        Self {
            connection_string: ":memory:".to_string(),
        }
    }

    /// Loads `.env` (when present) and reads `PEOPLE_DB_URI`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `PEOPLE_DB_URI` from one `.env` file without touching the
    /// process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path)
            .map_err(|err| ConfigError::EnvFile(format!("{}: {err}", path.display())))?
            .collect::<Result<HashMap<String, String>, _>>()
            .map_err(|err| ConfigError::EnvFile(format!("{}: {err}", path.display())))?;
        Self::from_lookup(|key| entries.get(key).cloned())
    }

    /// Reads settings through `lookup`, used by `from_env` and tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value =
            lookup(CONNECTION_STRING_VAR).ok_or(ConfigError::Missing(CONNECTION_STRING_VAR))?;
        Self::new(value)
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}
