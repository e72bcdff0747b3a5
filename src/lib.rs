// Stockaudit - Inventory audit sampling and reporting
// Copyright (c) 2025 Stockaudit Contributors
// Licensed under the MIT License

//! # Stockaudit - Inventory Audit Sampling and Reporting
//!
//! Stockaudit connects to a document store of inventory records, computes
//! extended values, filters and samples records against audit thresholds,
//! checks data integrity and exports the sample as audit evidence.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Valuing** records (`extendedValue = unitPrice × quantity`) in one batched write
//! - **Filtering** by high value, high price or low stock
//! - **Sampling** a bounded, uniformly random subset, reproducible with a seed
//! - **Checking** missing and negative fields, orphans and tag-sequence gaps
//! - **Joining** the normalized items/inventory/categories view
//! - **Exporting** the sample as delimited text with a SHA-256 receipt
//!
//! ## Architecture
//!
//! Stockaudit follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (valuation, sampling, integrity, export)
//! - [`adapters`] - Record store backends (in-memory, PostgreSQL)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stockaudit::adapters::store::connect;
//! use stockaudit::config::load_config;
//! use stockaudit::core::audit::{AuditRequest, AuditRunner, CollectionSelector};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("stockaudit.toml")?;
//!     let store = connect(&config).await?;
//!     let runner = AuditRunner::new(store, config.clone());
//!
//!     let collection = runner.select_collection(&CollectionSelector::Index(1)).await?;
//!     let request = AuditRequest::from_config(collection, &config.audit, false);
//!     let outcome = runner.run_audit(&request).await?;
//!
//!     println!("{}", outcome.format_summary());
//!     runner.export_results(&outcome, None).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Sampling
//!
//! A sample never exceeds the requested size and never repeats a record.
//! When fewer candidates exist than requested, all of them are returned and
//! the outcome says so:
//!
//! ```rust
//! use stockaudit::core::sampling::{SampleSize, Sampler};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sampler = Sampler::seeded(42);
//! let size = SampleSize::new(3)?;
//!
//! let drawn = sampler.sample((1..=10).collect::<Vec<i32>>(), size);
//! assert_eq!(drawn.len(), 3);
//! assert!(!drawn.is_complete());
//!
//! let all = sampler.sample(vec![1, 2], size);
//! assert!(all.is_complete());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Stockaudit uses the [`domain::AuditError`] type for all errors. Invalid
//! audit parameters are rejected before the store is touched:
//!
//! ```rust
//! use stockaudit::core::threshold::Threshold;
//! use stockaudit::domain::AuditError;
//!
//! assert!(matches!(Threshold::new(-1.0), Err(AuditError::InvalidInput(_))));
//! ```
//!
//! ## Logging
//!
//! Stockaudit uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(collection = "Storage", candidates = 120, "Threshold applied");
//! warn!(collection = "Storage", "No records matched the threshold");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
