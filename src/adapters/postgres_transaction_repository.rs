//! Postgres implementation of TransactionRepository.

use async_trait::async_trait;

use crate::db::PoolManager;
use crate::domain::{StoredTransaction, Transaction};
use crate::ports::{InsertOutcome, RepositoryResult, TransactionRepository};

const INSERT_IF_ABSENT: &str = r#"
    INSERT INTO transactions (id, vendor, amount, timestamp)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (id) DO NOTHING
"#;

/// Postgres-backed transaction repository.
///
/// Each call checks out one connection and returns it before the call ends.
#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PoolManager,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PoolManager) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn insert_if_absent(&self, tx: &Transaction) -> RepositoryResult<InsertOutcome> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(INSERT_IF_ABSENT)
            .bind(&tx.id)
            .bind(&tx.vendor)
            .bind(&tx.amount)
            .bind(tx.timestamp)
            .execute(&mut *conn)
            .await?;

        // ON CONFLICT DO NOTHING reports zero affected rows for an existing id
        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<StoredTransaction>> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, TransactionRow>(
            r#"SELECT id, vendor, amount, "timestamp", created_at FROM transactions WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(TransactionRow::into_domain))
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    vendor: String,
    amount: bigdecimal::BigDecimal,
    timestamp: chrono::DateTime<chrono::Utc>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TransactionRow {
    fn into_domain(self) -> StoredTransaction {
        StoredTransaction {
            transaction: Transaction {
                id: self.id,
                vendor: self.vendor,
                amount: self.amount,
                timestamp: self.timestamp,
            },
            created_at: self.created_at,
        }
    }
}
