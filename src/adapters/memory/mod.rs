//! In-memory record store
//!
//! Used for local audits over JSON exports and as the test double for every
//! core operation.

pub mod snapshot;
pub mod store;

pub use snapshot::SnapshotDir;
pub use store::MemoryStore;
