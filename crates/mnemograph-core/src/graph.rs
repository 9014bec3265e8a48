//! # Graph Engine
//!
//! The deterministic in-memory association graph.
//!
//! Undirected, simple, no self-loops. Repeated observations between the same
//! pair accumulate into one edge record. All data structures use `BTreeMap`
//! for deterministic ordering.
//!
//! This type has no locking of its own; the app layer wraps it in an
//! exclusive section.

use crate::weighting::{AssetMeta, WeightedObservation, WeightingPolicy};
use crate::{Attributes, EdgeAttrs, EdgeKey, LinkType, NodeKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of an edge upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeUpsert {
    /// A new edge was created.
    Created,
    /// An existing edge absorbed the observation.
    Updated,
    /// Both endpoints were the same node; nothing changed.
    SelfLoopIgnored,
}

/// The main Graph structure.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Node storage: NodeKey -> attributes
    nodes: BTreeMap<NodeKey, Attributes>,

    /// Edge storage: normalized pair -> accumulated attributes
    edges: BTreeMap<EdgeKey, EdgeAttrs>,

    /// Adjacency index: node -> neighbors
    adjacency: BTreeMap<NodeKey, BTreeSet<NodeKey>>,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node or merge attributes into an existing one.
    ///
    /// New values overwrite old values for the same key. Returns `true` when
    /// the node was created.
    pub fn upsert_node(&mut self, key: NodeKey, attrs: Attributes) -> bool {
        match self.nodes.get_mut(&key) {
            Some(existing) => {
                existing.extend(attrs);
                false
            }
            None => {
                self.nodes.insert(key, attrs);
                true
            }
        }
    }

    /// Record one similarity observation between `a` and `b`.
    ///
    /// Missing endpoints are created with empty attributes.
    pub fn upsert_edge(
        &mut self,
        a: &NodeKey,
        b: &NodeKey,
        similarity: f64,
        meta1: &Attributes,
        meta2: &Attributes,
        policy: &WeightingPolicy,
    ) -> EdgeUpsert {
        let Some(key) = EdgeKey::new(a, b) else {
            return EdgeUpsert::SelfLoopIgnored;
        };
        let observation = policy.weigh(
            similarity,
            AssetMeta::from_attributes(meta1),
            AssetMeta::from_attributes(meta2),
        );
        self.apply_observation(key, observation)
    }

    /// Fold an already weighted observation into the edge `key`.
    pub fn apply_observation(&mut self, key: EdgeKey, obs: WeightedObservation) -> EdgeUpsert {
        if let Some(edge) = self.edges.get_mut(&key) {
            edge.cumulative_weight += obs.weight;
            edge.shared_concepts_count = edge.shared_concepts_count.saturating_add(1);
            edge.max_similarity = edge.max_similarity.max(obs.similarity);
            edge.link_type = edge.link_type.promote(obs.link_type);
            return EdgeUpsert::Updated;
        }

        self.ensure_endpoint(key.low());
        self.ensure_endpoint(key.high());
        self.link(&key);
        self.edges.insert(
            key,
            EdgeAttrs {
                link_type: obs.link_type,
                max_similarity: obs.similarity,
                shared_concepts_count: 1,
                cumulative_weight: obs.weight,
            },
        );
        EdgeUpsert::Created
    }

    fn ensure_endpoint(&mut self, key: &NodeKey) {
        if !self.nodes.contains_key(key) {
            self.nodes.insert(key.clone(), Attributes::new());
        }
    }

    fn link(&mut self, key: &EdgeKey) {
        self.adjacency
            .entry(key.low().clone())
            .or_default()
            .insert(key.high().clone());
        self.adjacency
            .entry(key.high().clone())
            .or_default()
            .insert(key.low().clone());
    }

    /// Drop every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.adjacency.clear();
    }

    /// Attributes of a node.
    #[must_use]
    pub fn node(&self, key: &NodeKey) -> Option<&Attributes> {
        self.nodes.get(key)
    }

    /// Check if the graph contains a node.
    #[must_use]
    pub fn contains_node(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Attributes of the edge between `a` and `b`, in either orientation.
    #[must_use]
    pub fn edge(&self, a: &NodeKey, b: &NodeKey) -> Option<&EdgeAttrs> {
        self.edges.get(&EdgeKey::new(a, b)?)
    }

    /// Get all nodes in deterministic order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeKey, &Attributes)> {
        self.nodes.iter()
    }

    /// Get all edges in deterministic order.
    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &EdgeAttrs)> {
        self.edges.iter()
    }

    /// Neighbors of a node with the connecting edge, ordered by neighbor key.
    #[must_use]
    pub fn neighbors(&self, key: &NodeKey) -> Vec<(&NodeKey, &EdgeAttrs)> {
        self.adjacency
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|other| self.edge(key, other).map(|edge| (other, edge)))
            .collect()
    }

    /// Get the total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges currently classified as structural.
    #[must_use]
    pub fn structural_edge_count(&self) -> usize {
        self.edges
            .values()
            .filter(|e| e.link_type == LinkType::Structural)
            .count()
    }
}

// =============================================================================
// SERIALIZATION SUPPORT
// =============================================================================

/// Serializable representation of the graph for persistence and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableGraph {
    pub nodes: Vec<(NodeKey, Attributes)>,
    pub edges: Vec<(NodeKey, NodeKey, EdgeAttrs)>,
}

impl From<&Graph> for SerializableGraph {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph
                .nodes
                .iter()
                .map(|(k, attrs)| (k.clone(), attrs.clone()))
                .collect(),
            edges: graph
                .edges
                .iter()
                .map(|(k, e)| (k.low().clone(), k.high().clone(), e.clone()))
                .collect(),
        }
    }
}

impl From<SerializableGraph> for Graph {
    fn from(sg: SerializableGraph) -> Self {
        let mut graph = Graph::new();

        for (key, attrs) in sg.nodes {
            graph.upsert_node(key, attrs);
        }

        for (a, b, attrs) in sg.edges {
            let Some(key) = EdgeKey::new(&a, &b) else {
                continue;
            };
            graph.ensure_endpoint(key.low());
            graph.ensure_endpoint(key.high());
            graph.link(&key);
            graph.edges.insert(key, attrs);
        }

        graph
    }
}

// =============================================================================
// TESTS
// =============================================================================
