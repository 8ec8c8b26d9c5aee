//! Event ingestion: ordering, halting and atomic persistence.

pub mod ingest;

pub use ingest::{IngestOutcome, IngestionError, Ingestor};
