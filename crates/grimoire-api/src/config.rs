//! Runtime configuration read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | `postgres://localhost/grimoire` |
//! | `STORE_BACKEND` | `postgres` (`memory` keeps everything in-process) |
//! | `HOST` / `PORT` | `0.0.0.0` / `3000` |
//! | `PUBLIC_URL` | empty, pagination links are relative |
//! | `ALLOWED_ORIGINS` | `http://localhost:3000` |
//! | `CATEGORY_DELETE_POLICY` | `orphan` |
//! | `WIZARD_CONTENT_MIN_LEN` | `1` |
//! | `DB_MAX_CONNECTIONS` | `10` |

use std::str::FromStr;

use grimoire_core::defaults::{DATABASE_URL, SERVER_HOST, SERVER_PORT, WIZARD_CONTENT_MIN_LEN};
use grimoire_core::{Error, Result};
use grimoire_db::pool::DEFAULT_MAX_CONNECTIONS;

/// Which store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(Error::Config(format!("unknown STORE_BACKEND '{}'", other))),
        }
    }
}

/// What deleting a category does to the wizards it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryDeletePolicy {
    /// Delete the category only; owned wizards keep a dangling `categoryId`.
    #[default]
    Orphan,
    /// Refuse with a conflict while the category still owns wizards.
    Restrict,
    /// Delete the owned wizards along with the category.
    Cascade,
}

impl FromStr for CategoryDeletePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orphan" => Ok(CategoryDeletePolicy::Orphan),
            "restrict" => Ok(CategoryDeletePolicy::Restrict),
            "cascade" => Ok(CategoryDeletePolicy::Cascade),
            other => Err(Error::Config(format!(
                "unknown CATEGORY_DELETE_POLICY '{}' (expected orphan, restrict or cascade)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub store_backend: StoreBackend,
    pub host: String,
    pub port: u16,
    /// Prefix for URLs in the pagination `Link` header.
    pub public_url: String,
    pub allowed_origins: Vec<String>,
    pub delete_policy: CategoryDeletePolicy,
    pub content_min_len: usize,
    pub db_max_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            database_url: DATABASE_URL.to_string(),
            store_backend: StoreBackend::Postgres,
            host: SERVER_HOST.to_string(),
            port: SERVER_PORT,
            public_url: String::new(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            delete_policy: CategoryDeletePolicy::Orphan,
            content_min_len: WIZARD_CONTENT_MIN_LEN,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ApiConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset keys. Set-but-invalid values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{}'", v)))?,
            None => defaults.port,
        };

        let content_min_len = match lookup("WIZARD_CONTENT_MIN_LEN") {
            Some(v) => v.trim().parse::<usize>().map_err(|_| {
                Error::Config(format!("WIZARD_CONTENT_MIN_LEN must be an integer, got '{}'", v))
            })?,
            None => defaults.content_min_len,
        };
        if content_min_len == 0 {
            return Err(Error::Config(
                "WIZARD_CONTENT_MIN_LEN must be at least 1".to_string(),
            ));
        }

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v.trim().parse::<u32>().map_err(|_| {
                Error::Config(format!("DB_MAX_CONNECTIONS must be an integer, got '{}'", v))
            })?,
            None => defaults.db_max_connections,
        };

        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(v) if !v.trim().is_empty() => v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => defaults.allowed_origins,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            store_backend: lookup("STORE_BACKEND")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.store_backend),
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            public_url: lookup("PUBLIC_URL").unwrap_or(defaults.public_url),
            allowed_origins,
            delete_policy: lookup("CATEGORY_DELETE_POLICY")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(defaults.delete_policy),
            content_min_len,
            db_max_connections,
        })
    }
}
