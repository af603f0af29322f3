//! Transaction domain entity.
//! Framework-agnostic representation of an ingested financial transaction.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

/// A transaction as submitted by the caller.
///
/// `id` is caller-assigned and is the natural key in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub vendor: String,
    pub amount: BigDecimal,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        vendor: impl Into<String>,
        amount: BigDecimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            vendor: vendor.into(),
            amount,
            timestamp,
        }
    }
}

/// A persisted transaction together with its server-assigned creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTransaction {
    pub transaction: Transaction,
    pub created_at: Option<DateTime<Utc>>,
}
