//! PostgreSQL pool setup.
//!
//! The API process usually starts alongside its database, so the first
//! connection is retried a few times before startup gives up.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use grimoire_core::{Error, Result};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Seconds a request waits for a free connection.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Attempts for the initial connection, at least 1.
    pub connect_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub retry_delay: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n.max(1);
        self
    }

    pub fn connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts.max(1);
        self
    }

    /// Wait before retry number `attempt` (1-based).
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Only failures to reach the server are worth retrying.
fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_)
    )
}

/// Open the pool, retrying unreachable-server errors with backoff.
pub async fn connect_pool(database_url: &str, config: &PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    let options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout);

    let mut attempt = 1;
    loop {
        match options.clone().connect(database_url).await {
            Ok(pool) => {
                info!(
                    subsystem = "database",
                    component = "pool",
                    op = "connect",
                    attempt,
                    max_connections = config.max_connections,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Database pool ready"
                );
                return Ok(pool);
            }
            Err(e) if is_transient(&e) && attempt < config.connect_attempts => {
                let delay = config.backoff(attempt);
                warn!(
                    subsystem = "database",
                    component = "pool",
                    op = "connect",
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "Database not reachable yet"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(Error::Database(e)),
        }
    }
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

impl PoolStats {
    pub fn of(pool: &PgPool) -> Self {
        Self {
            size: pool.size(),
            idle: pool.num_idle(),
        }
    }

    /// Every open connection is checked out.
    pub fn is_saturated(&self) -> bool {
        self.size > 0 && self.idle == 0
    }
}

/// Log occupancy; warns once the pool has no idle connection left.
pub fn log_pool_stats(pool: &PgPool) {
    let stats = PoolStats::of(pool);
    debug!(
        subsystem = "database",
        component = "pool",
        pool_size = stats.size,
        pool_idle = stats.idle,
        "Pool stats"
    );
    if stats.is_saturated() {
        warn!(
            subsystem = "database",
            component = "pool",
            pool_size = stats.size,
            "All pool connections in use"
        );
    }
}
