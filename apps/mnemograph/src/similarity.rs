//! # Similarity Collaborator
//!
//! The rebuild delegates edge recreation to a [`SimilarityEngine`]: given an
//! asset, it submits every pairwise observation touching that asset through
//! [`GraphStore::upsert_edge`]. Scoring itself happens upstream.
//!
//! [`ObservationReplay`] is the bundled engine. It replays the observations
//! recorded in the corpus, so running it once per asset over an empty store
//! reproduces the graph the online path built.

use crate::store::GraphStore;
use mnemograph_core::{EdgeUpsert, GraphError, NodeKey, ObservationLog};
use std::future::Future;

/// Recomputes and submits the edges of one asset.
///
/// Not idempotent: calling it twice for the same asset on the same store
/// double-counts that asset's observations.
pub trait SimilarityEngine {
    /// Submit all pairwise edges touching `asset_id`. Returns how many
    /// observations reached the graph.
    fn recompute_edges_for(
        &self,
        store: &GraphStore,
        asset_id: &NodeKey,
    ) -> impl Future<Output = Result<usize, GraphError>> + Send;
}

/// Replays the observations an [`ObservationLog`] recorded for an asset.
#[derive(Debug)]
pub struct ObservationReplay<'a, L> {
    log: &'a L,
}

impl<'a, L> ObservationReplay<'a, L> {
    pub fn new(log: &'a L) -> Self {
        Self { log }
    }
}

impl<L: ObservationLog + Sync> SimilarityEngine for ObservationReplay<'_, L> {
    async fn recompute_edges_for(
        &self,
        store: &GraphStore,
        asset_id: &NodeKey,
    ) -> Result<usize, GraphError> {
        let observations = self.log.observations_for(asset_id)?;
        let own_meta = self.log.asset_metadata(asset_id)?.unwrap_or_default();

        let mut submitted = 0;
        for obs in observations {
            let other_meta = self.log.asset_metadata(&obs.other)?.unwrap_or_default();
            let outcome = store
                .upsert_edge(asset_id, &obs.other, obs.similarity, &own_meta, &other_meta)
                .await;
            if outcome != EdgeUpsert::SelfLoopIgnored {
                submitted += 1;
            }
        }

        tracing::debug!(asset = %asset_id, submitted, "Replayed asset observations");
        Ok(submitted)
    }
}
