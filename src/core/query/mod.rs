//! Store-independent query building
//!
//! [`Filter`] predicates and [`Pipeline`]s describe reads without tying them
//! to a backend. The [`executor`] runs pipelines in memory; the PostgreSQL
//! adapter translates them to SQL.

pub mod executor;
pub mod filter;
pub mod pipeline;

pub use filter::Filter;
pub use pipeline::{Pipeline, Stage};
