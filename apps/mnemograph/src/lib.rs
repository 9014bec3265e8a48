//! # mnemograph
//!
//! Association graph over cognitive assets: an async [`GraphStore`] that
//! owns the graph and its snapshot, online ingestion of similarity
//! observations, and the [`RebuildOrchestrator`] that regenerates the whole
//! graph from the durable corpus.
//!
//! The weighting and fold rules live in `mnemograph-core`; this crate adds
//! the concurrency, persistence and command-line plumbing around them.

pub mod batch;
pub mod config;
pub mod error;
pub mod ingest;
pub mod rebuild;
pub mod similarity;
pub mod store;

pub use batch::IngestBatch;
pub use config::{ConfigError, Settings};
pub use error::AppError;
pub use ingest::{IngestSummary, apply_online};
pub use rebuild::{FailedAsset, RebuildError, RebuildOrchestrator, RebuildReport};
pub use similarity::{ObservationReplay, SimilarityEngine};
pub use store::{GraphStore, SnapshotInfo};
