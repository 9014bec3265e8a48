//! # Graph Store
//!
//! Sole owner of the in-memory association graph and its snapshot file.
//!
//! Every mutation goes through one `tokio::sync::Mutex` per store, so
//! concurrent tasks never interleave partial updates of a node or an edge.
//! The guard is an RAII value: it is released on every exit path.
//!
//! ## Snapshots
//!
//! `save()` holds the graph lock only while encoding the graph to bytes, then
//! writes the file outside of it (uniquely named temporary sibling + rename).
//! The snapshot is therefore a consistent cut, but mutators are not blocked
//! for the duration of the disk write and callers must not rely on that.
//!
//! Saves themselves are serialized by a second lock held across encode and
//! write, so the file on disk always holds the most recently encoded cut.

use mnemograph_core::{
    Attributes, EdgeUpsert, Graph, GraphError, NodeKey, SerializableGraph, WeightingPolicy,
    graph_from_bytes, graph_to_bytes,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// Figures about a snapshot that was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub nodes: usize,
    pub edges: usize,
    pub bytes: usize,
}

/// The graph plus its snapshot location.
#[derive(Debug)]
pub struct GraphStore {
    path: PathBuf,
    policy: WeightingPolicy,
    graph: Mutex<Graph>,
    save_lock: Mutex<()>,
}

impl GraphStore {
    /// Open the store at `path`, loading a prior snapshot if there is one.
    ///
    /// Never fails: a missing or unreadable snapshot yields an empty graph.
    pub fn open(path: impl Into<PathBuf>, policy: WeightingPolicy) -> Self {
        let path = path.into();
        let graph = load_snapshot(&path);
        tracing::info!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Graph store opened"
        );
        Self {
            path,
            policy,
            graph: Mutex::new(graph),
            save_lock: Mutex::new(()),
        }
    }

    /// Snapshot location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Weighting rules applied by `upsert_edge`.
    #[must_use]
    pub fn policy(&self) -> &WeightingPolicy {
        &self.policy
    }

    /// Create a node or merge `attrs` into it. Returns `true` if created.
    pub async fn upsert_node(&self, key: NodeKey, attrs: Attributes) -> bool {
        let mut graph = self.graph.lock().await;
        graph.upsert_node(key, attrs)
    }

    /// Fold one similarity observation into the edge `{a, b}`.
    pub async fn upsert_edge(
        &self,
        a: &NodeKey,
        b: &NodeKey,
        similarity: f64,
        meta1: &Attributes,
        meta2: &Attributes,
    ) -> EdgeUpsert {
        if a == b {
            return EdgeUpsert::SelfLoopIgnored;
        }
        let mut graph = self.graph.lock().await;
        graph.upsert_edge(a, b, similarity, meta1, meta2, &self.policy)
    }

    /// Discard all in-memory state.
    pub async fn reset(&self) {
        let mut graph = self.graph.lock().await;
        graph.clear();
        tracing::debug!(path = %self.path.display(), "Graph store reset");
    }

    /// Run a read-only closure against the graph.
    pub async fn read<R>(&self, f: impl FnOnce(&Graph) -> R) -> R {
        let graph = self.graph.lock().await;
        f(&graph)
    }

    /// Current number of nodes.
    pub async fn node_count(&self) -> usize {
        self.read(Graph::node_count).await
    }

    /// Current number of edges.
    pub async fn edge_count(&self) -> usize {
        self.read(Graph::edge_count).await
    }

    /// Owned copy of the whole graph, for export.
    pub async fn export(&self) -> SerializableGraph {
        self.read(|graph| SerializableGraph::from(graph)).await
    }

    /// Whether a snapshot file is present.
    #[must_use]
    pub fn snapshot_exists(&self) -> bool {
        self.path.exists()
    }

    /// Delete the snapshot file. Returns `Ok(false)` if there was none.
    pub fn discard_snapshot(&self) -> std::io::Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)?;
        Ok(true)
    }

    /// Write the snapshot, replacing any previous one.
    pub async fn try_save(&self) -> Result<SnapshotInfo, GraphError> {
        let _saving = self.save_lock.lock().await;

        let (bytes, nodes, edges) = {
            let graph = self.graph.lock().await;
            (
                graph_to_bytes(&graph)?,
                graph.node_count(),
                graph.edge_count(),
            )
        };

        let path = self.path.clone();
        let len = bytes.len();
        tokio::task::spawn_blocking(move || write_snapshot(&path, &bytes))
            .await
            .map_err(|e| GraphError::IoError(format!("snapshot writer failed: {}", e)))??;

        Ok(SnapshotInfo {
            nodes,
            edges,
            bytes: len,
        })
    }

    /// Write the snapshot; failures are logged, not raised.
    ///
    /// Returns `false` when the snapshot was not updated.
    pub async fn save(&self) -> bool {
        match self.try_save().await {
            Ok(info) => {
                tracing::info!(
                    path = %self.path.display(),
                    nodes = info.nodes,
                    edges = info.edges,
                    bytes = info.bytes,
                    "Graph snapshot saved"
                );
                true
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), "Failed to save graph snapshot: {}", e);
                false
            }
        }
    }
}

// =============================================================================
// SNAPSHOT FILE I/O
// =============================================================================

fn load_snapshot(path: &Path) -> Graph {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No graph snapshot found, starting empty");
        return Graph::new();
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(path = %path.display(), "Cannot read graph snapshot: {}. Starting empty", e);
            return Graph::new();
        }
    };

    match graph_from_bytes(&bytes) {
        Ok(graph) => graph,
        Err(e) => {
            tracing::error!(path = %path.display(), "Invalid graph snapshot: {}. Starting empty", e);
            Graph::new()
        }
    }
}

fn write_snapshot(path: &Path, bytes: &[u8]) -> Result<(), GraphError> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(|e| {
                GraphError::IoError(format!("Create directory '{}': {}", parent.display(), e))
            })?;
            parent
        }
        None => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| {
        GraphError::IoError(format!("Create temporary file in '{}': {}", parent.display(), e))
    })?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| GraphError::IoError(format!("Write '{}': {}", tmp.path().display(), e)))?;
    tmp.persist(path)
        .map_err(|e| GraphError::IoError(format!("Replace '{}': {}", path.display(), e.error)))?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_snapshot_replaces_previous_file() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("graph.mnem");

        write_snapshot(&path, b"first").expect("write");
        write_snapshot(&path, b"second").expect("write");

        assert_eq!(std::fs::read(&path).expect("read"), b"second");
        let leftovers = std::fs::read_dir(temp.path()).expect("list").count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn load_snapshot_missing_file_is_empty() {
        let temp = tempdir().expect("temp dir");
        let graph = load_snapshot(&temp.path().join("absent.mnem"));
        assert_eq!(graph.node_count(), 0);
    }

    #[tokio::test]
    async fn self_loop_skips_the_lock_and_the_graph() {
        let temp = tempdir().expect("temp dir");
        let store = GraphStore::open(temp.path().join("g.mnem"), WeightingPolicy::default());
        let a = NodeKey::from("a");

        let result = store
            .upsert_edge(&a, &a, 0.9, &Attributes::new(), &Attributes::new())
            .await;

        assert_eq!(result, EdgeUpsert::SelfLoopIgnored);
        assert_eq!(store.node_count().await, 0);
    }
}
