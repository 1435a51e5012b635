//! Checkpoint Store (Component A, §4.1): persists and resumes per-source
//! pipeline state keyed by a source fingerprint.

mod store;

pub use store::CheckpointStore;
