//! # Snapshot Format
//!
//! `MNEM` + one version byte + postcard-encoded [`SerializableGraph`].
//!
//! The payload codec is private to this module; callers only see
//! `graph_to_bytes` and `graph_from_bytes`. A new codec gets a new version
//! byte.

use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES};
use crate::{Graph, GraphError, SerializableGraph};

/// Largest snapshot accepted on load (500 MB).
pub const MAX_PERSISTENCE_PAYLOAD_SIZE: usize = 500 * 1024 * 1024;

/// Magic plus version byte.
pub const HEADER_LEN: usize = 5;

/// Encode a graph into snapshot bytes. No file I/O.
pub fn graph_to_bytes(graph: &Graph) -> Result<Vec<u8>, GraphError> {
    let mut out = Vec::with_capacity(HEADER_LEN);
    out.extend_from_slice(MAGIC_BYTES);
    out.push(FORMAT_VERSION);

    postcard::to_extend(&SerializableGraph::from(graph), out)
        .map_err(|e| GraphError::SerializationError(e.to_string()))
}

/// Decode snapshot bytes. Size and prefix are checked before the payload
/// is touched, so foreign or truncated files fail without allocating.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<Graph, GraphError> {
    if bytes.len() > MAX_PERSISTENCE_PAYLOAD_SIZE {
        return Err(GraphError::DeserializationError(format!(
            "Snapshot of {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PERSISTENCE_PAYLOAD_SIZE
        )));
    }

    let payload = match bytes.strip_prefix(MAGIC_BYTES.as_slice()) {
        Some([version, payload @ ..]) if *version == FORMAT_VERSION => payload,
        Some([version, ..]) => {
            return Err(GraphError::DeserializationError(format!(
                "Unsupported snapshot version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }
        _ => {
            return Err(GraphError::DeserializationError(
                "Not a mnemograph snapshot".to_string(),
            ));
        }
    };

    let serializable: SerializableGraph = postcard::from_bytes(payload).map_err(|e| {
        GraphError::DeserializationError(format!("Corrupt snapshot payload: {}", e))
    })?;

    Ok(Graph::from(serializable))
}

// =============================================================================
// TESTS
// =============================================================================
