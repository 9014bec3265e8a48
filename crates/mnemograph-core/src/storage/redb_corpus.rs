//! # redb-backed Asset Corpus
//!
//! A durable corpus of cognitive assets using the redb embedded database:
//! - ACID transactions (a batch lands entirely or not at all)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! The corpus is the source of truth for a rebuild. It stores asset
//! metadata, canonical stream records and the similarity observations
//! recorded for each asset, and enumerates them in key order.

use crate::corpus::{AssetCorpus, ObservationLog, ObservationRecord, StreamRecord};
use crate::{AttrValue, Attributes, GraphError, NodeKey};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::collections::BTreeMap;
use std::path::Path;

/// Table for assets: asset id -> postcard `Attributes`
const ASSETS: TableDefinition<&str, &[u8]> = TableDefinition::new("assets");

/// Table for stream records: record id -> postcard `(role, timestamp)`
const STREAM: TableDefinition<&str, &[u8]> = TableDefinition::new("stream");

/// Table for observations: (asset id, sequence) -> postcard `ObservationRecord`
const OBSERVATIONS: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("observations");

type StreamFields = (Option<String>, Option<AttrValue>);

fn storage(e: impl std::fmt::Display) -> GraphError {
    GraphError::StorageError(e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, GraphError> {
    postcard::to_allocvec(value).map_err(|e| GraphError::SerializationError(e.to_string()))
}

fn decode<'a, T: serde::Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, GraphError> {
    postcard::from_bytes(bytes).map_err(|e| GraphError::DeserializationError(e.to_string()))
}

/// A batch of corpus writes committed in one transaction.
#[derive(Debug, Clone, Default)]
pub struct CorpusBatch {
    pub assets: Vec<(NodeKey, Attributes)>,
    pub stream: Vec<StreamRecord>,
    pub observations: Vec<(NodeKey, ObservationRecord)>,
}

impl CorpusBatch {
    /// Whether the batch carries nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.stream.is_empty() && self.observations.is_empty()
    }
}

/// The redb-backed corpus.
pub struct RedbCorpus {
    db: Database,
}

impl std::fmt::Debug for RedbCorpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbCorpus").finish_non_exhaustive()
    }
}

impl RedbCorpus {
    /// Open or create a corpus database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let db = Database::create(path.as_ref()).map_err(storage)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(storage)?;
            let _ = write_txn.open_table(ASSETS).map_err(storage)?;
            let _ = write_txn.open_table(STREAM).map_err(storage)?;
            let _ = write_txn.open_table(OBSERVATIONS).map_err(storage)?;
            write_txn.commit().map_err(storage)?;
        }

        Ok(Self { db })
    }

    /// Write a batch in a single ACID transaction.
    ///
    /// Observations are appended after whatever the asset already has,
    /// preserving batch order. An observing asset the corpus does not know
    /// yet is registered with empty metadata, so a rebuild replays it.
    pub fn write_batch(&self, batch: &CorpusBatch) -> Result<(), GraphError> {
        if batch.is_empty() {
            return Ok(());
        }

        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut assets = write_txn.open_table(ASSETS).map_err(storage)?;
            for (id, meta) in &batch.assets {
                let bytes = encode(meta)?;
                assets
                    .insert(id.as_str(), bytes.as_slice())
                    .map_err(storage)?;
            }

            let mut stream = write_txn.open_table(STREAM).map_err(storage)?;
            for record in &batch.stream {
                let fields: StreamFields = (record.role.clone(), record.timestamp.clone());
                let bytes = encode(&fields)?;
                stream
                    .insert(record.id.as_str(), bytes.as_slice())
                    .map_err(storage)?;
            }

            let mut observations = write_txn.open_table(OBSERVATIONS).map_err(storage)?;
            let mut next_seq: BTreeMap<&str, u64> = BTreeMap::new();
            for (asset, obs) in &batch.observations {
                let id = asset.as_str();
                let seq = match next_seq.get(id) {
                    Some(seq) => *seq,
                    None => {
                        if assets.get(id).map_err(storage)?.is_none() {
                            let empty = encode(&Attributes::new())?;
                            assets.insert(id, empty.as_slice()).map_err(storage)?;
                        }
                        let last = observations
                            .range((id, 0u64)..=(id, u64::MAX))
                            .map_err(storage)?
                            .next_back()
                            .transpose()
                            .map_err(storage)?
                            .map(|(key, _)| key.value().1);
                        last.map_or(0, |seq| seq + 1)
                    }
                };

                let bytes = encode(obs)?;
                observations
                    .insert((id, seq), bytes.as_slice())
                    .map_err(storage)?;
                next_seq.insert(id, seq + 1);
            }
        }
        write_txn.commit().map_err(storage)?;

        Ok(())
    }
}

impl AssetCorpus for RedbCorpus {
    fn list_asset_ids(&self) -> Result<Vec<NodeKey>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(ASSETS).map_err(storage)?;

        let mut ids = Vec::new();
        for entry in table.iter().map_err(storage)? {
            let (key, _) = entry.map_err(storage)?;
            ids.push(NodeKey::new(key.value()));
        }
        Ok(ids)
    }

    fn list_stream_records(&self) -> Result<Vec<StreamRecord>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(STREAM).map_err(storage)?;

        let mut records = Vec::new();
        for entry in table.iter().map_err(storage)? {
            let (key, value) = entry.map_err(storage)?;
            let (role, timestamp): StreamFields = decode(value.value())?;
            records.push(StreamRecord {
                id: NodeKey::new(key.value()),
                role,
                timestamp,
            });
        }
        Ok(records)
    }
}

impl ObservationLog for RedbCorpus {
    fn asset_metadata(&self, id: &NodeKey) -> Result<Option<Attributes>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(ASSETS).map_err(storage)?;

        match table.get(id.as_str()).map_err(storage)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    fn observations_for(&self, id: &NodeKey) -> Result<Vec<ObservationRecord>, GraphError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(OBSERVATIONS).map_err(storage)?;
        let id = id.as_str();

        let mut records = Vec::new();
        for entry in table.range((id, 0u64)..=(id, u64::MAX)).map_err(storage)? {
            let (_, value) = entry.map_err(storage)?;
            records.push(decode(value.value())?);
        }
        Ok(records)
    }
}

// =============================================================================
// TESTS
// =============================================================================
