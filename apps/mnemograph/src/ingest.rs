//! # Online Ingestion
//!
//! Applies a freshly committed corpus batch to the live graph. Nodes are
//! upserted first; every observation then runs as its own task against a
//! shared `Arc<GraphStore>`, so edge folds race exactly as they would under
//! concurrent producers and rely on the store lock for consistency.

use crate::store::GraphStore;
use mnemograph_core::{CorpusBatch, EdgeUpsert, GraphError, ObservationLog};
use serde::Serialize;
use std::sync::Arc;

/// What one batch did to the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub nodes_created: usize,
    pub nodes_updated: usize,
    pub edges_created: usize,
    pub edges_updated: usize,
    pub self_loops_ignored: usize,
}

/// Apply `batch` to `store`. Asset metadata is read back from `log`, so
/// the batch must already be committed to the corpus.
pub async fn apply_online(
    store: Arc<GraphStore>,
    batch: &CorpusBatch,
    log: &impl ObservationLog,
) -> Result<IngestSummary, GraphError> {
    let mut summary = IngestSummary::default();

    for record in &batch.stream {
        if store
            .upsert_node(record.id.clone(), record.node_attributes())
            .await
        {
            summary.nodes_created += 1;
        } else {
            summary.nodes_updated += 1;
        }
    }

    let mut handles = Vec::with_capacity(batch.observations.len());
    for (asset, obs) in &batch.observations {
        let meta1 = log.asset_metadata(asset)?.unwrap_or_default();
        let meta2 = log.asset_metadata(&obs.other)?.unwrap_or_default();
        let store = Arc::clone(&store);
        let (a, b, similarity) = (asset.clone(), obs.other.clone(), obs.similarity);

        handles.push(tokio::spawn(async move {
            store.upsert_edge(&a, &b, similarity, &meta1, &meta2).await
        }));
    }

    for handle in handles {
        let outcome = handle
            .await
            .map_err(|e| GraphError::IoError(format!("edge task failed: {}", e)))?;
        match outcome {
            EdgeUpsert::Created => summary.edges_created += 1,
            EdgeUpsert::Updated => summary.edges_updated += 1,
            EdgeUpsert::SelfLoopIgnored => summary.self_loops_ignored += 1,
        }
    }

    tracing::info!(
        nodes_created = summary.nodes_created,
        edges_created = summary.edges_created,
        edges_updated = summary.edges_updated,
        "Batch applied to graph"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemograph_core::{
        Attributes, NodeKey, ObservationRecord, StreamRecord, WeightingPolicy,
    };
    use tempfile::tempdir;

    struct NoMeta;

    impl ObservationLog for NoMeta {
        fn asset_metadata(&self, _: &NodeKey) -> Result<Option<Attributes>, GraphError> {
            Ok(None)
        }

        fn observations_for(&self, _: &NodeKey) -> Result<Vec<ObservationRecord>, GraphError> {
            Ok(Vec::new())
        }
    }

    fn obs(asset: &str, other: &str, similarity: f64) -> (NodeKey, ObservationRecord) {
        (
            NodeKey::from(asset),
            ObservationRecord {
                other: NodeKey::from(other),
                similarity,
            },
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn repeated_pair_counts_every_observation() {
        let temp = tempdir().expect("temp dir");
        let store = Arc::new(GraphStore::open(
            temp.path().join("g.mnem"),
            WeightingPolicy::default(),
        ));

        let batch = CorpusBatch {
            assets: Vec::new(),
            stream: vec![StreamRecord {
                id: NodeKey::from("a"),
                role: None,
                timestamp: None,
            }],
            observations: (0..50).map(|_| obs("a", "b", 0.5)).collect(),
        };

        let summary = apply_online(Arc::clone(&store), &batch, &NoMeta)
            .await
            .expect("apply");

        assert_eq!(summary.nodes_created, 1);
        assert_eq!(summary.edges_created, 1);
        assert_eq!(summary.edges_updated, 49);

        let edge = store
            .read(|g| g.edge(&NodeKey::from("a"), &NodeKey::from("b")).cloned())
            .await
            .expect("edge");
        assert_eq!(edge.shared_concepts_count, 50);
        // default metadata: modifier 0.25, weight 0.125 per observation
        assert!((edge.cumulative_weight - 6.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn self_observation_is_counted_as_ignored() {
        let temp = tempdir().expect("temp dir");
        let store = Arc::new(GraphStore::open(
            temp.path().join("g.mnem"),
            WeightingPolicy::default(),
        ));
        let batch = CorpusBatch {
            observations: vec![obs("a", "a", 0.99)],
            ..CorpusBatch::default()
        };

        let summary = apply_online(Arc::clone(&store), &batch, &NoMeta)
            .await
            .expect("apply");

        assert_eq!(summary.self_loops_ignored, 1);
        assert_eq!(store.edge_count().await, 0);
    }
}
