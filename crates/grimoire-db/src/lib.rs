//! # grimoire-db
//!
//! Store implementations for grimoire.
//!
//! This crate provides:
//! - Connection pool setup with startup retry
//! - PostgreSQL repositories for categories and wizards
//! - An in-memory store with the same semantics, for tests and local runs
//!
//! ## Example
//!
//! ```rust,ignore
//! use grimoire_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/grimoire").await?;
//!     db.migrate().await?;
//!     let store = db.store();
//!     Ok(())
//! }
//! ```
pub mod categories;
pub mod memory;
pub mod pool;
pub mod wizards;

// Test fixtures for integration tests
pub mod test_fixtures;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

// Re-export core types
pub use grimoire_core::*;

pub use categories::PgCategoryRepository;
pub use memory::MemoryStore;
pub use pool::{connect_pool, log_pool_stats, PoolConfig, PoolStats};
pub use wizards::PgWizardRepository;

/// Map a failed write, turning unique-constraint violations into
/// [`Error::Conflict`] with `conflict_msg`.
pub(crate) fn map_write_error(err: sqlx::Error, conflict_msg: &str) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return Error::Conflict(conflict_msg.to_string());
        }
    }
    Error::Database(err)
}

/// PostgreSQL-backed store with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Category repository.
    pub categories: Arc<PgCategoryRepository>,
    /// Wizard repository.
    pub wizards: Arc<PgWizardRepository>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            wizards: Arc::new(PgWizardRepository::new(pool.clone())),
            pool,
        }
    }

    /// Connect with the default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_config(database_url, PoolConfig::default()).await
    }

    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = connect_pool(database_url, &config).await?;
        Ok(Self::new(pool))
    }

    /// Run embedded migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Bundle the repositories as injectable handles.
    pub fn store(&self) -> Store {
        Store::new(
            self.categories.clone(),
            self.wizards.clone(),
            Arc::new(self.clone()),
        )
    }
}

#[async_trait]
impl HealthCheck for Database {
    async fn health_check(&self) -> Result<bool> {
        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => {
                log_pool_stats(&self.pool);
                Ok(true)
            }
            Err(e) => {
                warn!(subsystem = "database", op = "health_check", error = %e, "Database unreachable");
                Ok(false)
            }
        }
    }
}
