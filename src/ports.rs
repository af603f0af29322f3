//! Storage seam between the ingestion use case and a concrete store.

use async_trait::async_trait;
use thiserror::Error;

use crate::db::PoolError;
use crate::domain::{StoredTransaction, Transaction};

/// Result of a single insert-or-ignore write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted,
    /// A row with the same id already existed; nothing was written.
    Duplicate,
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Writes the transaction unless a row with the same id exists.
    /// Never overwrites an existing row.
    async fn insert_if_absent(&self, tx: &Transaction) -> RepositoryResult<InsertOutcome>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<StoredTransaction>>;
}
