//! # Formats Module
//!
//! Snapshot byte format. File I/O lives in the app layer.

mod persistence;

pub use persistence::*;
