//! Connection pool setup.
//!
//! Only the pool size and acquire timeout are tunable at runtime; minimum
//! size, idle timeout and lifetime come from [`gallery_core::defaults`].

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use gallery_core::defaults;
use gallery_core::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: defaults::POOL_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(defaults::POOL_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero is raised to one.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n.max(1);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(defaults::POOL_MIN_CONNECTIONS.min(self.max_connections))
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(Duration::from_secs(defaults::POOL_IDLE_TIMEOUT_SECS))
            .max_lifetime(Duration::from_secs(defaults::POOL_MAX_LIFETIME_SECS))
    }
}

/// Open a pool against `database_url`.
pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    debug!(
        subsystem = "db",
        component = "pool",
        op = "create",
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        "Opening connection pool"
    );

    let pool = config
        .options()
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "create",
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Connection pool ready"
    );
    Ok(pool)
}

/// Log pool occupancy; warns when every connection is checked out.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();
    if size > 0 && idle == 0 {
        warn!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            "No idle connections left in pool"
        );
    } else {
        debug!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            pool_idle = idle,
            "Pool metrics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, defaults::POOL_MAX_CONNECTIONS);
        assert_eq!(
            config.acquire_timeout,
            Duration::from_secs(defaults::POOL_CONNECT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_options_carry_config() {
        let options = PoolConfig::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(3))
            .options();
        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(3));
        assert_eq!(
            options.get_idle_timeout(),
            Some(Duration::from_secs(defaults::POOL_IDLE_TIMEOUT_SECS))
        );
    }

    #[test]
    fn test_min_connections_never_exceed_max() {
        let options = PoolConfig::new().max_connections(0).options();
        assert_eq!(options.get_max_connections(), 1);
        assert!(options.get_min_connections() <= 1);
    }
}
