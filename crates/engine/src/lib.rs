//! `stocklens-engine` — batch data-quality engine for retail inventory
//! extracts: validation, quarantine, fuzzy reconciliation, aggregation.
//!
//! Pure engine crate: receives pre-loaded records, returns the fact table
//! and quarantine ledger. No CLI or filesystem dependencies.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod reconcile;
pub mod validate;

pub use config::PipelineConfig;
pub use engine::{run, PipelineInput, DATASET_DAMAGE, DATASET_RESTOCK, DATASET_SNAPSHOT};
pub use error::PipelineError;
pub use model::{
    FactRow, MasterCatalog, PipelineResult, QuarantinedRecord, Record, RecordBatch,
};
