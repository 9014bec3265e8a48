//! # CLI Command Implementations

use mnemograph::{
    AppError, GraphStore, IngestBatch, ObservationReplay, RebuildOrchestrator, RebuildReport,
    Settings, apply_online,
};
use mnemograph_core::{GraphError, LinkType, NodeKey, RedbCorpus};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum batch file size for ingestion (100 MB).
const MAX_INGEST_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), GraphError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| GraphError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(GraphError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path (symlinks, "..") and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, GraphError> {
    let canonical = path.canonicalize().map_err(|e| {
        GraphError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(GraphError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path against its canonical parent directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, GraphError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let canonical_parent = parent.canonicalize().map_err(|e| {
        GraphError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(GraphError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| GraphError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Open the corpus, creating its directory on first use.
fn open_corpus(path: &Path) -> Result<RedbCorpus, GraphError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            GraphError::IoError(format!("Create directory '{}': {}", parent.display(), e))
        })?;
    }
    RedbCorpus::open(path)
}

fn open_store(settings: &Settings) -> Result<GraphStore, AppError> {
    Ok(GraphStore::open(&settings.graph_path, settings.policy()?))
}

fn print_json(value: &impl serde::Serialize) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// INGEST COMMAND
// =============================================================================

/// Commit a batch file to the corpus, then apply it to the live graph.
pub async fn cmd_ingest(settings: &Settings, json_mode: bool, file: &Path) -> Result<(), AppError> {
    tracing::info!("Ingesting batch from {:?}", file);

    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_INGEST_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| GraphError::IoError(format!("Read file: {}", e)))?;
    let batch = IngestBatch::from_slice(&contents)?.into_corpus_batch()?;

    if batch.is_empty() {
        tracing::warn!("Batch is empty, nothing to ingest");
        return Ok(());
    }

    // The corpus commit comes first: the graph can always be rebuilt from it.
    let corpus = open_corpus(&settings.corpus_path)?;
    corpus.write_batch(&batch)?;

    let store = Arc::new(open_store(settings)?);
    let summary = apply_online(Arc::clone(&store), &batch, &corpus).await?;
    let snapshot = store.try_save().await?;

    if json_mode {
        print_json(&serde_json::json!({
            "assets": batch.assets.len(),
            "stream_records": batch.stream.len(),
            "observations": batch.observations.len(),
            "graph": summary,
            "snapshot": {
                "path": store.path().to_string_lossy(),
                "nodes": snapshot.nodes,
                "edges": snapshot.edges,
                "bytes": snapshot.bytes
            }
        }));
        return Ok(());
    }

    println!(
        "Committed {} assets, {} stream records, {} observations",
        batch.assets.len(),
        batch.stream.len(),
        batch.observations.len()
    );
    println!(
        "Graph: {} nodes created, {} edges created, {} edges updated",
        summary.nodes_created, summary.edges_created, summary.edges_updated
    );
    if summary.self_loops_ignored > 0 {
        println!("Ignored {} self-observations", summary.self_loops_ignored);
    }
    println!(
        "Snapshot: {} nodes, {} edges, {} bytes",
        snapshot.nodes, snapshot.edges, snapshot.bytes
    );

    Ok(())
}

// =============================================================================
// REBUILD COMMAND
// =============================================================================

/// Regenerate the graph from the corpus. Ctrl+C aborts without persisting.
pub async fn cmd_rebuild(settings: &Settings, json_mode: bool) -> Result<(), AppError> {
    let corpus = open_corpus(&settings.corpus_path)?;
    let store = open_store(settings)?;
    let engine = ObservationReplay::new(&corpus);
    let orchestrator = RebuildOrchestrator::new(&store, &corpus, &engine);

    let report = tokio::select! {
        result = orchestrator.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Rebuild interrupted");
            return Err(AppError::Interrupted);
        }
    };

    print_rebuild_report(&report, json_mode);

    if !report.snapshot_written {
        return Err(AppError::SnapshotNotWritten(
            store.path().display().to_string(),
        ));
    }
    Ok(())
}

fn print_rebuild_report(report: &RebuildReport, json_mode: bool) {
    if json_mode {
        print_json(report);
        return;
    }

    println!("Graph Rebuild");
    println!("=============");
    println!("Assets:           {}", report.assets);
    println!("Observations:     {}", report.observations);
    println!("Nodes:            {}", report.nodes);
    println!("Edges:            {}", report.edges);
    println!("Structural Edges: {}", report.structural_edges);
    println!("Failed Assets:    {}", report.failed_assets.len());
    for failed in &report.failed_assets {
        println!("  {}: {}", failed.asset, failed.reason);
    }
    println!(
        "Snapshot:         {}",
        if report.snapshot_written {
            "written"
        } else {
            "NOT written"
        }
    );
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show graph status.
pub async fn cmd_status(settings: &Settings, json_mode: bool) -> Result<(), AppError> {
    let store = open_store(settings)?;
    let (nodes, edges, structural) = store
        .read(|g| (g.node_count(), g.edge_count(), g.structural_edge_count()))
        .await;

    if json_mode {
        print_json(&serde_json::json!({
            "graph": settings.graph_path.to_string_lossy(),
            "corpus": settings.corpus_path.to_string_lossy(),
            "snapshot_exists": store.snapshot_exists(),
            "structural_threshold": store.policy().structural_threshold(),
            "node_count": nodes,
            "edge_count": edges,
            "structural_edges": structural,
            "associative_edges": edges - structural
        }));
        return Ok(());
    }

    println!("mnemograph Status");
    println!("=================");
    println!("Graph:     {:?}", settings.graph_path);
    println!("Corpus:    {:?}", settings.corpus_path);
    println!("Threshold: {}", store.policy().structural_threshold());
    println!();
    println!("Nodes:            {}", nodes);
    println!("Edges:            {}", edges);
    println!("Structural Edges: {}", structural);
    if !store.snapshot_exists() {
        println!();
        println!("(no snapshot on disk)");
    }

    Ok(())
}

// =============================================================================
// NEIGHBORS COMMAND
// =============================================================================

/// List the edges touching one node, strongest first.
pub async fn cmd_neighbors(settings: &Settings, json_mode: bool, node: &str) -> Result<(), AppError> {
    let store = open_store(settings)?;
    let key = NodeKey::from(node);

    let (found, mut neighbors) = store
        .read(|g| {
            let neighbors: Vec<_> = g
                .neighbors(&key)
                .into_iter()
                .map(|(other, attrs)| (other.clone(), attrs.clone()))
                .collect();
            (g.contains_node(&key), neighbors)
        })
        .await;
    neighbors.sort_by(|a, b| b.1.cumulative_weight.total_cmp(&a.1.cumulative_weight));

    if json_mode {
        let list: Vec<_> = neighbors
            .iter()
            .map(|(other, attrs)| {
                serde_json::json!({
                    "node": other,
                    "link_type": attrs.link_type,
                    "max_similarity": attrs.max_similarity,
                    "shared_concepts_count": attrs.shared_concepts_count,
                    "cumulative_weight": attrs.cumulative_weight
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "node": node,
            "found": found,
            "neighbors": list
        }));
        return Ok(());
    }

    if !found {
        println!("Node '{}' not found", node);
        return Ok(());
    }

    println!("Neighbors of '{}' ({})", node, neighbors.len());
    for (other, attrs) in &neighbors {
        let marker = match attrs.link_type {
            LinkType::Structural => "S",
            LinkType::Associative => "A",
        };
        println!(
            "  [{}] {}  weight={:.4}  max_sim={:.4}  count={}",
            marker, other, attrs.cumulative_weight, attrs.max_similarity, attrs.shared_concepts_count
        );
    }

    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Write the graph as pretty JSON.
pub async fn cmd_export(settings: &Settings, output: &Path) -> Result<(), AppError> {
    let validated_output = validate_output_path(output)?;

    let store = open_store(settings)?;
    let graph = store.export().await;
    let data = serde_json::to_vec_pretty(&graph)
        .map_err(|e| GraphError::SerializationError(e.to_string()))?;

    std::fs::write(&validated_output, &data)
        .map_err(|e| GraphError::IoError(format!("Write file: {}", e)))?;

    println!("Exported {} bytes to {:?}", data.len(), validated_output);

    Ok(())
}
