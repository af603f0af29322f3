pub mod ingest_batch;

pub use ingest_batch::{BatchReport, IngestBatch, RecordOutcome, RecordStatus};
