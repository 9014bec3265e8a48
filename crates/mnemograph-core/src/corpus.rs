//! # Corpus Interfaces
//!
//! The durable asset corpus is a collaborator: the graph can always be
//! regenerated from it. Two traits split what it offers:
//!
//! - [`AssetCorpus`]: enumeration used by the rebuild (asset ids and the
//!   canonical stream records that become nodes)
//! - [`ObservationLog`]: per-asset metadata and the similarity observations
//!   recorded for an asset, replayed to recreate edges

use crate::primitives::{ROLE_KEY, TIMESTAMP_KEY};
use crate::{AttrValue, Attributes, GraphError, NodeKey};
use serde::{Deserialize, Serialize};

/// One canonical record of the conversation stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRecord {
    pub id: NodeKey,
    pub role: Option<String>,
    pub timestamp: Option<AttrValue>,
}

impl StreamRecord {
    /// Node attributes for this record. Absent fields are left out.
    #[must_use]
    pub fn node_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        if let Some(role) = &self.role {
            attrs.insert(ROLE_KEY.to_string(), AttrValue::Text(role.clone()));
        }
        if let Some(ts) = &self.timestamp {
            attrs.insert(TIMESTAMP_KEY.to_string(), ts.clone());
        }
        attrs
    }
}

/// A similarity observation recorded against an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub other: NodeKey,
    pub similarity: f64,
}

/// Enumeration side of the corpus.
pub trait AssetCorpus {
    /// Every asset id, in corpus order.
    fn list_asset_ids(&self) -> Result<Vec<NodeKey>, GraphError>;

    /// Every canonical stream record, in corpus order.
    fn list_stream_records(&self) -> Result<Vec<StreamRecord>, GraphError>;
}

/// Per-asset lookups used to replay observations.
pub trait ObservationLog {
    /// Metadata of an asset (importance, confidence, ...), if known.
    fn asset_metadata(&self, id: &NodeKey) -> Result<Option<Attributes>, GraphError>;

    /// Observations recorded for `id`, oldest first.
    fn observations_for(&self, id: &NodeKey) -> Result<Vec<ObservationRecord>, GraphError>;
}
