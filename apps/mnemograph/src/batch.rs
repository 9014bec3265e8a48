//! # Ingest Batch Format
//!
//! JSON document accepted by `mnemograph ingest`:
//!
//! ```json
//! {
//!   "assets": [{ "id": "a1", "metadata": { "importance": 8, "confidence": 9 } }],
//!   "stream": [{ "id": "a1", "role": "user", "timestamp": 1700000000 }],
//!   "observations": [{ "asset": "a1", "other": "a2", "similarity": 0.91 }]
//! }
//! ```
//!
//! Every section is optional. Metadata values must be scalars; nulls are
//! dropped.

use mnemograph_core::{
    AttrValue, Attributes, CorpusBatch, GraphError, NodeKey, ObservationRecord, StreamRecord,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum number of entries across all sections of one batch.
pub const MAX_BATCH_ENTRIES: usize = 1_000_000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestBatch {
    pub assets: Vec<AssetEntry>,
    pub stream: Vec<StreamEntry>,
    pub observations: Vec<ObservationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetEntry {
    pub id: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamEntry {
    pub id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationEntry {
    pub asset: String,
    pub other: String,
    pub similarity: f64,
}

impl IngestBatch {
    /// Parse a batch from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len() + self.stream.len() + self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate and convert into corpus writes.
    pub fn into_corpus_batch(self) -> Result<CorpusBatch, GraphError> {
        if self.len() > MAX_BATCH_ENTRIES {
            return Err(GraphError::InvalidInput(format!(
                "batch has {} entries, maximum is {}",
                self.len(),
                MAX_BATCH_ENTRIES
            )));
        }

        let mut batch = CorpusBatch::default();

        for asset in self.assets {
            let id = node_key(asset.id, "asset id")?;
            let mut attrs = Attributes::new();
            for (name, value) in asset.metadata {
                if let Some(value) = json_to_attr(&name, value)? {
                    attrs.insert(name, value);
                }
            }
            batch.assets.push((id, attrs));
        }

        for entry in self.stream {
            let timestamp = match entry.timestamp {
                Some(value) => json_to_attr("timestamp", value)?,
                None => None,
            };
            batch.stream.push(StreamRecord {
                id: node_key(entry.id, "stream id")?,
                role: entry.role,
                timestamp,
            });
        }

        for obs in self.observations {
            if !obs.similarity.is_finite() {
                return Err(GraphError::InvalidInput(format!(
                    "similarity between '{}' and '{}' is not finite",
                    obs.asset, obs.other
                )));
            }
            batch.observations.push((
                node_key(obs.asset, "observation asset")?,
                ObservationRecord {
                    other: node_key(obs.other, "observation other")?,
                    similarity: obs.similarity,
                },
            ));
        }

        Ok(batch)
    }
}

fn node_key(id: String, what: &str) -> Result<NodeKey, GraphError> {
    if id.trim().is_empty() {
        return Err(GraphError::InvalidInput(format!("{} must not be empty", what)));
    }
    Ok(NodeKey::new(id))
}

/// Scalar JSON to attribute value. `null` maps to `None`.
fn json_to_attr(name: &str, value: Value) -> Result<Option<AttrValue>, GraphError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(AttrValue::Bool(b))),
        Value::String(s) => Ok(Some(AttrValue::Text(s))),
        Value::Number(n) => n
            .as_i64()
            .map(AttrValue::Int)
            .or_else(|| n.as_f64().map(AttrValue::Float))
            .map(Some)
            .ok_or_else(|| {
                GraphError::InvalidInput(format!("'{}' is not a representable number", name))
            }),
        Value::Array(_) | Value::Object(_) => Err(GraphError::InvalidInput(format!(
            "'{}' must be a scalar value",
            name
        ))),
    }
}
