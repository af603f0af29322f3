pub mod transaction;

pub use transaction::{StoredTransaction, Transaction};
