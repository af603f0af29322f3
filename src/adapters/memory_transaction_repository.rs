//! In-memory implementation of TransactionRepository.
//!
//! Backs the HTTP tests and local runs without a database. Individual ids can
//! be marked as failing to simulate store errors for a single record.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

use crate::domain::{StoredTransaction, Transaction};
use crate::ports::{InsertOutcome, RepositoryError, RepositoryResult, TransactionRepository};

#[derive(Debug, Default)]
pub struct MemoryTransactionRepository {
    rows: DashMap<String, StoredTransaction>,
    failing_ids: DashSet<String>,
}

impl MemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write of `id` fail with `RepositoryError::Unavailable`.
    pub fn fail_on(&self, id: impl Into<String>) {
        self.failing_ids.insert(id.into());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl TransactionRepository for MemoryTransactionRepository {
    async fn insert_if_absent(&self, tx: &Transaction) -> RepositoryResult<InsertOutcome> {
        if self.failing_ids.contains(&tx.id) {
            return Err(RepositoryError::Unavailable(format!(
                "simulated write failure for {}",
                tx.id
            )));
        }

        match self.rows.entry(tx.id.clone()) {
            Entry::Occupied(_) => Ok(InsertOutcome::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(StoredTransaction {
                    transaction: tx.clone(),
                    created_at: Some(Utc::now()),
                });
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<StoredTransaction>> {
        Ok(self.rows.get(id).map(|row| row.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn tx(id: &str, vendor: &str, amount: &str) -> Transaction {
        Transaction::new(id, vendor, BigDecimal::from_str(amount).unwrap(), Utc::now())
    }

    #[tokio::test]
    async fn test_first_write_wins() {
        let repo = MemoryTransactionRepository::new();

        let first = repo.insert_if_absent(&tx("tx-1", "Grocer", "10.00")).await.unwrap();
        let second = repo.insert_if_absent(&tx("tx-1", "Other", "99.00")).await.unwrap();

        assert_eq!(first, InsertOutcome::Inserted);
        assert_eq!(second, InsertOutcome::Duplicate);
        assert_eq!(repo.len(), 1);

        let stored = repo.find_by_id("tx-1").await.unwrap().unwrap();
        assert_eq!(stored.transaction.vendor, "Grocer");
        assert!(stored.created_at.is_some());
    }

    #[tokio::test]
    async fn test_failing_id_is_not_stored() {
        let repo = MemoryTransactionRepository::new();
        repo.fail_on("bad");

        let result = repo.insert_if_absent(&tx("bad", "Grocer", "1.00")).await;

        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
        assert!(repo.is_empty());
        assert!(repo.find_by_id("bad").await.unwrap().is_none());
    }
}
