//! Startup table creation for the `transactions` table.

use crate::db::pool_manager::{PoolError, PoolManager};

pub const CREATE_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id TEXT PRIMARY KEY,
    vendor TEXT NOT NULL,
    amount NUMERIC(10, 2) NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ DEFAULT NOW()
)
"#;

/// Creates the `transactions` table if it does not exist yet. Safe to run on
/// every start.
pub async fn ensure_schema(pool: &PoolManager) -> Result<(), PoolError> {
    let mut conn = pool.acquire().await?;
    sqlx::query(CREATE_TRANSACTIONS_TABLE)
        .execute(&mut *conn)
        .await
        .map_err(PoolError::Query)?;

    tracing::info!("Database table 'transactions' is ready");
    Ok(())
}
