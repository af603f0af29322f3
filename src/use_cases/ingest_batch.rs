//! Ingest batch use case.
//! Writes a batch of transactions record by record, keeping going when a
//! single record fails.

use std::sync::Arc;

use crate::domain::Transaction;
use crate::ports::{InsertOutcome, TransactionRepository};
use crate::validation::validate_transaction;

/// What happened to one record of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    /// A new row was written.
    Inserted,
    /// The id already existed and the record was ignored.
    Duplicate,
    /// The record was rejected or the write failed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub id: String,
    pub status: RecordStatus,
}

/// Per-record outcomes of one batch, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    pub fn inserted(&self) -> usize {
        self.count(|status| matches!(status, RecordStatus::Inserted))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|status| matches!(status, RecordStatus::Duplicate))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, RecordStatus::Failed(_)))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, predicate: impl Fn(&RecordStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.status))
            .count()
    }
}

/// Use case for ingesting a batch of transactions.
pub struct IngestBatch {
    transaction_repository: Arc<dyn TransactionRepository>,
}

impl IngestBatch {
    pub fn new(transaction_repository: Arc<dyn TransactionRepository>) -> Self {
        Self {
            transaction_repository,
        }
    }

    /// Writes every record in order. Never fails as a whole: a record that
    /// cannot be written is reported as `RecordStatus::Failed` and the loop
    /// moves on to the next one.
    pub async fn execute(&self, batch: Vec<Transaction>) -> BatchReport {
        let mut outcomes = Vec::with_capacity(batch.len());

        for tx in batch {
            let status = self.write_one(&tx).await;
            outcomes.push(RecordOutcome { id: tx.id, status });
        }

        let report = BatchReport { outcomes };
        tracing::info!(
            records = report.len(),
            inserted = report.inserted(),
            duplicates = report.duplicates(),
            failed = report.failed(),
            "Batch ingested"
        );
        report
    }

    async fn write_one(&self, tx: &Transaction) -> RecordStatus {
        if let Err(e) = validate_transaction(tx) {
            tracing::warn!(transaction_id = %tx.id, error = %e, "Rejected transaction");
            return RecordStatus::Failed(e.to_string());
        }

        match self.transaction_repository.insert_if_absent(tx).await {
            Ok(InsertOutcome::Inserted) => RecordStatus::Inserted,
            Ok(InsertOutcome::Duplicate) => {
                tracing::debug!(transaction_id = %tx.id, "Duplicate transaction ignored");
                RecordStatus::Duplicate
            }
            Err(e) => {
                tracing::warn!(transaction_id = %tx.id, error = %e, "Error inserting transaction");
                RecordStatus::Failed(e.to_string())
            }
        }
    }
}
