//! Core business logic for Stockaudit.
//!
//! This module contains the audit engine and its building blocks.
//!
//! # Modules
//!
//! - [`query`] - Filters, pipelines and the in-memory pipeline executor
//! - [`valuation`] - Extended-value computation and cleanup
//! - [`threshold`] - Threshold criteria, client-side or pushed down
//! - [`sampling`] - Bounded uniform sampling without replacement
//! - [`integrity`] - Presence, sign, orphan and tag-sequence checks
//! - [`normalized`] - The joined normalized view and its import
//! - [`export`] - Delimited-text export, JSON dumps and checksums
//! - [`audit`] - The audit runner tying the above together
//! - [`ingest`] - CSV files loaded into a collection
//! - [`analytics`] - Price-increase, NRV, excess and slow-moving stock reports
//!
//! # Audit Workflow
//!
//! 1. **Select**: Resolve the collection by name or 1-based index
//! 2. **Value**: Compute `extendedValue` and persist it in one batched write
//! 3. **Filter**: Apply the threshold in the store
//! 4. **Sample**: Draw at most `k` records uniformly at random
//! 5. **Export**: Write the eight-column sample with a SHA-256 receipt
//!
//! # Example
//!
//! ```rust,no_run
//! use stockaudit::adapters::memory::MemoryStore;
//! use stockaudit::config::StockauditConfig;
//! use stockaudit::core::audit::{AuditRequest, AuditRunner, CollectionSelector};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StockauditConfig::default();
//! let runner = AuditRunner::new(Arc::new(MemoryStore::new()), config.clone());
//!
//! let collection = runner
//!     .select_collection(&CollectionSelector::Name("Storage".to_string()))
//!     .await?;
//! let request = AuditRequest::from_config(collection, &config.audit, false);
//! let outcome = runner.run_audit(&request).await?;
//!
//! println!("{}", outcome.format_summary());
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod audit;
pub mod export;
pub mod ingest;
pub mod integrity;
pub mod normalized;
pub mod query;
pub mod sampling;
pub mod threshold;
pub mod valuation;
