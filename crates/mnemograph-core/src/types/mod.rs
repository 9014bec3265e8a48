//! # Core Type Definitions
//!
//! This module contains all core types for the mnemograph association graph:
//! - Graph identifiers (`NodeKey`, `EdgeKey`)
//! - Scalar metadata (`AttrValue`, `Attributes`)
//! - Edge state (`LinkType`, `EdgeAttrs`)
//! - Error types (`GraphError`)
//!
//! ## Determinism Guarantees
//!
//! - Keys implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Edge keys are normalized so `(a, b)` and `(b, a)` name the same edge
//! - Counters use saturating arithmetic to prevent overflow

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Opaque identity of a node (an asset or stream record id).
///
/// The key is immutable once a node is created; re-inserting the same key
/// only merges attributes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey(pub String);

impl NodeKey {
    /// Create a new node key from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of an undirected edge.
///
/// Always stored as `(low, high)` with `low < high`, so the two orientations
/// of a pair collapse into a single key. Self-pairs cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    low: NodeKey,
    high: NodeKey,
}

impl EdgeKey {
    /// Build the key for the pair `{a, b}`.
    ///
    /// Returns `None` when `a == b` (no self-loops).
    #[must_use]
    pub fn new(a: &NodeKey, b: &NodeKey) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self {
                low: a.clone(),
                high: b.clone(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                low: b.clone(),
                high: a.clone(),
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The lexicographically smaller endpoint.
    #[must_use]
    pub fn low(&self) -> &NodeKey {
        &self.low
    }

    /// The lexicographically larger endpoint.
    #[must_use]
    pub fn high(&self) -> &NodeKey {
        &self.high
    }
}

// =============================================================================
// SCALAR METADATA
// =============================================================================

/// A scalar attribute value carried by nodes and asset metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    /// Numeric view of the value. Text and booleans are not numbers.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for AttrValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Open-ended attribute mapping. BTreeMap keeps iteration deterministic.
pub type Attributes = BTreeMap<String, AttrValue>;

// =============================================================================
// EDGE STATE
// =============================================================================

/// Classification of an association by similarity strength.
///
/// Ordered so that `Associative < Structural`: promotion is `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Associative,
    Structural,
}

impl LinkType {
    /// One-way upgrade: structural stays structural.
    #[must_use]
    pub fn promote(self, observed: LinkType) -> LinkType {
        self.max(observed)
    }

    /// Lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Associative => "associative",
            Self::Structural => "structural",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accumulated state of one undirected edge.
///
/// Every field is a fold over the observations applied to the edge:
/// max, count, sum and a monotone type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttrs {
    pub link_type: LinkType,
    pub max_similarity: f64,
    pub shared_concepts_count: u64,
    pub cumulative_weight: f64,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the mnemograph core.
///
/// - No silent failures
/// - Use `Result<T, GraphError>` for fallible operations
/// - The core never panics; callers decide which errors are recoverable
#[derive(Debug, Error)]
pub enum GraphError {
    /// Input could not be interpreted (bad id, bad score, bad batch).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The corpus database reported an error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

// =============================================================================
// TESTS
// =============================================================================
