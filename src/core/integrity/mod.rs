//! Data integrity checks
//!
//! - [`scan`] - presence/sign checks, total inventory value, orphan detection
//! - [`tags`] - tag-sequence gaps and repeats
//! - [`report`] - report structures

pub mod report;
pub mod scan;
pub mod tags;

pub use report::{
    format_currency, CheckResult, CheckStatus, IntegrityReport, NormalizedIntegrityReport,
};
pub use scan::IntegrityChecker;
pub use tags::{
    analyze_tag_sequence, collect_tags, sample_collection_tags, scan_collection_tags, TagAnalysis,
    TagSample, TagScanReport, DEFAULT_MAX_TAG_SPAN,
};
