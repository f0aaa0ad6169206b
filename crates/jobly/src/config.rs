//! Runtime configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file) or
//! from a TOML file:
//!
//! ```toml
//! [database]
//! url = "postgres://localhost/jobly"
//! pool_max_size = 8
//! ```

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;
use std::path::Path;

/// Default maximum number of pooled connections.
pub const DEFAULT_POOL_MAX_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoblyConfig {
    pub database_url: String,
    pub pool_max_size: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    database: DatabaseSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabaseSection {
    url: String,
    #[serde(default)]
    pool_max_size: Option<usize>,
}

impl JoblyConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
        }
    }

    pub fn pool_max_size(mut self, size: usize) -> Self {
        self.pool_max_size = size;
        self
    }

    /// Read `DATABASE_URL` and `JOBLY_POOL_MAX_SIZE`, loading `.env` first if present.
    pub fn from_env() -> JoblyResult<Self> {
        // A missing .env file is fine; real environment variables still apply.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| JoblyError::config("DATABASE_URL is not set"))?;

        let pool_max_size = match lookup("JOBLY_POOL_MAX_SIZE") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                JoblyError::config(format!("JOBLY_POOL_MAX_SIZE={raw:?} is invalid: {e}"))
            })?,
            None => DEFAULT_POOL_MAX_SIZE,
        };

        Self::new(database_url).pool_max_size(pool_max_size).validated()
    }

    pub fn from_toml_str(raw: &str) -> JoblyResult<Self> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| JoblyError::config(format!("failed to parse config: {e}")))?;
        Self::new(file.database.url)
            .pool_max_size(file.database.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE))
            .validated()
    }

    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    fn validated(self) -> JoblyResult<Self> {
        if self.pool_max_size == 0 {
            return Err(JoblyError::config("pool_max_size must be at least 1"));
        }
        Ok(self)
    }
}
