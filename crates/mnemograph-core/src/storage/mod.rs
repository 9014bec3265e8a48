//! # Storage Module
//!
//! Disk-backed corpus adapter built on redb.

mod redb_corpus;

pub use redb_corpus::{CorpusBatch, RedbCorpus};
