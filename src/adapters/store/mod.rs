//! Record store abstraction layer
//!
//! Core operations only see [`RecordStore`]; the factory picks the backend.

pub mod factory;
pub mod traits;

pub use factory::{connect, create_record_store, handshake_timeout, verify_connection};
pub use traits::{BulkWriteResult, RecordStore};
