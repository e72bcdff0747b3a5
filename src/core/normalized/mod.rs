//! Normalized schema: import and aggregation
//!
//! - [`import`] - builds items, categories and inventory facts from flat
//!   collections
//! - [`aggregator`] - the left-outer `Item ⟕ InventoryFact ⟕ Category` view

pub mod aggregator;
pub mod import;

pub use aggregator::{NormalizedAggregator, NormalizedSelection};
pub use import::{ImportSummary, NormalizedData, NormalizedImporter};
