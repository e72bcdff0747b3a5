//! PostgreSQL record store
//!
//! Documents are kept as JSONB rows keyed by `(collection, id)`.

pub mod adapter;
pub mod client;
pub mod models;
pub mod sql;

pub use adapter::PostgreSQLStore;
pub use client::PostgreSQLClient;
pub use models::DocumentRow;
