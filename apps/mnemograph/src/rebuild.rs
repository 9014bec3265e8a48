//! # Rebuild Orchestration
//!
//! Full wipe-and-regenerate of the association graph from the corpus.
//!
//! ## Phases
//!
//! 1. **Discard**: delete the stale snapshot, reset the store to empty
//! 2. **Enumerate**: list every asset id; an empty corpus aborts
//! 3. **Nodes**: upsert one node per canonical stream record
//! 4. **Edges**: ask the similarity engine to recompute each asset's edges;
//!    a failing asset is logged and skipped
//! 5. **Persist**: save the snapshot once
//!
//! A fatal error in phases 1-3 stops the run before anything is persisted.
//! The engine only gives a correct graph when each asset is replayed exactly
//! once against an empty store, which is what phase 1 guarantees.

use crate::similarity::SimilarityEngine;
use crate::store::GraphStore;
use mnemograph_core::{AssetCorpus, GraphError, NodeKey};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal rebuild failures. Nothing is persisted when one of these occurs.
#[derive(Debug, Error)]
pub enum RebuildError {
    /// The stale snapshot could not be deleted.
    #[error("Cannot delete stale snapshot '{}': {source}", .path.display())]
    Discard {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus could not be enumerated.
    #[error("Corpus error: {0}")]
    Corpus(#[from] GraphError),

    /// The corpus holds no assets; there is nothing to rebuild from.
    #[error("Corpus contains no assets, rebuild is impossible")]
    EmptyCorpus,
}

/// An asset whose edges could not be recreated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedAsset {
    pub asset: NodeKey,
    pub reason: String,
}

/// Summary of a completed rebuild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebuildReport {
    pub assets: usize,
    pub nodes: usize,
    pub edges: usize,
    pub structural_edges: usize,
    pub observations: usize,
    pub failed_assets: Vec<FailedAsset>,
    pub snapshot_written: bool,
}

/// Runs the rebuild protocol against one store.
pub struct RebuildOrchestrator<'a, C, E> {
    store: &'a GraphStore,
    corpus: &'a C,
    engine: &'a E,
}

impl<'a, C, E> RebuildOrchestrator<'a, C, E>
where
    C: AssetCorpus,
    E: SimilarityEngine,
{
    pub fn new(store: &'a GraphStore, corpus: &'a C, engine: &'a E) -> Self {
        Self {
            store,
            corpus,
            engine,
        }
    }

    /// Execute all phases in order.
    pub async fn run(&self) -> Result<RebuildReport, RebuildError> {
        tracing::info!(path = %self.store.path().display(), "Graph rebuild started");

        self.discard().await?;
        let asset_ids = self.enumerate_assets()?;
        self.recreate_nodes().await?;
        let (observations, failed_assets) = self.recreate_edges(&asset_ids).await;

        let (nodes, edges, structural_edges) = self
            .store
            .read(|g| (g.node_count(), g.edge_count(), g.structural_edge_count()))
            .await;
        tracing::info!(
            nodes,
            edges,
            structural_edges,
            failed = failed_assets.len(),
            "Edge recreation finished"
        );

        let snapshot_written = self.store.save().await;

        Ok(RebuildReport {
            assets: asset_ids.len(),
            nodes,
            edges,
            structural_edges,
            observations,
            failed_assets,
            snapshot_written,
        })
    }

    async fn discard(&self) -> Result<(), RebuildError> {
        match self.store.discard_snapshot() {
            Ok(true) => {
                tracing::warn!(path = %self.store.path().display(), "Deleted stale graph snapshot");
            }
            Ok(false) => {
                tracing::info!("No stale graph snapshot, starting from a clean slate");
            }
            Err(source) => {
                tracing::error!(
                    path = %self.store.path().display(),
                    "Cannot delete stale graph snapshot: {}",
                    source
                );
                return Err(RebuildError::Discard {
                    path: self.store.path().to_path_buf(),
                    source,
                });
            }
        }
        self.store.reset().await;
        Ok(())
    }

    fn enumerate_assets(&self) -> Result<Vec<NodeKey>, RebuildError> {
        let asset_ids = self.corpus.list_asset_ids().inspect_err(|e| {
            tracing::error!("Cannot enumerate assets: {}", e);
        })?;

        if asset_ids.is_empty() {
            tracing::error!("No assets in corpus, rebuild is impossible");
            return Err(RebuildError::EmptyCorpus);
        }

        tracing::info!(assets = asset_ids.len(), "Assets enumerated");
        Ok(asset_ids)
    }

    async fn recreate_nodes(&self) -> Result<(), RebuildError> {
        let records = self.corpus.list_stream_records().inspect_err(|e| {
            tracing::error!("Cannot enumerate stream records: {}", e);
        })?;

        for record in &records {
            self.store
                .upsert_node(record.id.clone(), record.node_attributes())
                .await;
        }

        let nodes = self.store.node_count().await;
        tracing::info!(records = records.len(), nodes, "Nodes recreated");
        Ok(())
    }

    async fn recreate_edges(&self, asset_ids: &[NodeKey]) -> (usize, Vec<FailedAsset>) {
        let total = asset_ids.len();
        let step = (total / 10).max(1);
        let mut observations = 0;
        let mut failed = Vec::new();

        for (i, asset_id) in asset_ids.iter().enumerate() {
            match self.engine.recompute_edges_for(self.store, asset_id).await {
                Ok(submitted) => observations += submitted,
                Err(e) => {
                    tracing::warn!(asset = %asset_id, "Failed to recreate edges: {}", e);
                    failed.push(FailedAsset {
                        asset: asset_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            let processed = i + 1;
            if processed % step == 0 || processed == total {
                tracing::info!(processed, total, "Edge recreation progress");
            }
        }

        (observations, failed)
    }
}
