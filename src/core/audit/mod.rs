//! Audit orchestration
//!
//! [`AuditRunner`] drives one session: collection selection, valuation,
//! threshold filtering, sampling, integrity scans, export and cleanup.

pub mod outcome;
pub mod preview;
pub mod runner;

pub use outcome::{AuditEntry, AuditOutcome, AuditWarning};
pub use preview::{CollectionPreview, DEFAULT_PREVIEW_LIMIT};
pub use runner::{AuditRequest, AuditRunner, CollectionSelector};
