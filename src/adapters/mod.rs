//! Record store integrations for Stockaudit.
//!
//! This module provides the record store abstraction and its backends:
//!
//! - [`store`] - The [`RecordStore`](store::RecordStore) trait and the backend factory
//! - [`memory`] - In-memory store backed by optional JSON snapshot files
//! - [`postgresql`] - PostgreSQL JSONB document table
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate drivers from the audit
//! engine. Core operations receive an `Arc<dyn RecordStore>` and never see a
//! driver type; the in-memory backend doubles as the test store.
//!
//! ```rust,no_run
//! use stockaudit::adapters::store::connect;
//! use stockaudit::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("stockaudit.toml")?;
//! let store = connect(&config).await?;
//!
//! for name in store.list_collections().await? {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod postgresql;
pub mod store;
