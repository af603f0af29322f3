use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Postgres;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("connection pool exhausted: no connection available within {0:?}")]
    Exhausted(Duration),

    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("database query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl PoolError {
    fn from_acquire(err: sqlx::Error, timeout: Duration) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => PoolError::Exhausted(timeout),
            other => PoolError::Connection(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
    pub max_connections: u32,
}

/// Bounded pool of PostgreSQL connections shared by every request.
///
/// Cloning is cheap and every clone refers to the same underlying pool.
#[derive(Clone, Debug)]
pub struct PoolManager {
    pool: PgPool,
    acquire_timeout: Duration,
}

impl PoolManager {
    pub async fn new(config: &Config) -> Result<Self, PoolError> {
        let acquire_timeout = Duration::from_secs(config.acquire_timeout_secs);
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| PoolError::from_acquire(e, acquire_timeout))?;

        tracing::info!(
            max_connections = config.max_connections,
            acquire_timeout_secs = config.acquire_timeout_secs,
            "Database pool created"
        );

        Ok(Self {
            pool,
            acquire_timeout,
        })
    }

    /// Wraps an already constructed pool.
    pub fn from_pool(pool: PgPool) -> Self {
        let acquire_timeout = pool.options().get_acquire_timeout();
        Self {
            pool,
            acquire_timeout,
        }
    }

    /// Checks a connection out of the pool.
    ///
    /// The connection goes back to the pool when the returned guard is
    /// dropped, on every exit path of the caller.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, PoolError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| PoolError::from_acquire(e, self.acquire_timeout))
    }

    pub async fn health_check(&self) -> Result<(), PoolError> {
        let mut conn = self.acquire().await?;
        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map_err(PoolError::Query)?;
        Ok(())
    }

    /// Closes every connection and waits for checked-out ones to come back.
    pub async fn shutdown(&self) {
        if self.pool.is_closed() {
            return;
        }
        let stats = self.stats();
        tracing::info!(size = stats.size, idle = stats.idle, "Draining database pool");
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let err = PoolError::from_acquire(sqlx::Error::PoolTimedOut, Duration::from_secs(5));
        assert!(matches!(err, PoolError::Exhausted(d) if d == Duration::from_secs(5)));
    }

    #[test]
    fn test_other_errors_map_to_connection() {
        let err = PoolError::from_acquire(sqlx::Error::PoolClosed, Duration::from_secs(5));
        assert!(matches!(err, PoolError::Connection(sqlx::Error::PoolClosed)));
    }

    #[tokio::test]
    async fn test_lazy_pool_reports_configured_max() {
        let pool = PgPoolOptions::new()
            .max_connections(3)
            .connect_lazy("postgres://localhost/lifeos")
            .unwrap();
        let manager = PoolManager::from_pool(pool);

        let stats = manager.stats();
        assert_eq!(stats.max_connections, 3);
        assert_eq!(stats.size, 0);
    }

    #[tokio::test]
    async fn test_acquire_after_shutdown_fails() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/lifeos")
            .unwrap();
        let manager = PoolManager::from_pool(pool);

        manager.shutdown().await;

        let err = manager.acquire().await.unwrap_err();
        assert!(matches!(err, PoolError::Connection(sqlx::Error::PoolClosed)));
    }
}
