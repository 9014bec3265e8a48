//! # mnemograph-core
//!
//! The deterministic association-graph engine - THE LOGIC.
//!
//! This crate records pairwise similarity observations between cognitive
//! assets as weighted, undirected edges, and defines the snapshot format and
//! the corpus the graph can be rebuilt from.
//!
//! ## Architectural Constraints
//!
//! - Holds no locks and does no logging; the app layer owns concurrency
//! - Edge state is a fold (sum, max, count, one-way promotion) so the final
//!   graph depends only on the multiset of observations
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod corpus;
pub mod formats;
pub mod graph;
pub mod primitives;
pub mod storage;
pub mod types;
pub mod weighting;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{AttrValue, Attributes, EdgeAttrs, EdgeKey, GraphError, LinkType, NodeKey};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use corpus::{AssetCorpus, ObservationLog, ObservationRecord, StreamRecord};
pub use graph::{EdgeUpsert, Graph, SerializableGraph};
pub use storage::{CorpusBatch, RedbCorpus};
pub use weighting::{AssetMeta, WeightedObservation, WeightingPolicy};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{graph_from_bytes, graph_to_bytes};
