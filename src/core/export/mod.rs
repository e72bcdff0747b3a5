//! Result export
//!
//! - [`row`] - the fixed eight-column audit row
//! - [`writer`] - delimited text output with checksum receipts
//! - [`dump`] - whole-collection JSON dumps
//! - [`checksum`] - SHA-256 digests and `.sha256` sidecars

pub mod checksum;
pub mod dump;
pub mod row;
pub mod writer;

pub use dump::{CollectionDumper, DumpedFile, KeyPreset, KeySelection};
pub use row::{AuditRow, COLUMNS};
pub use writer::{ExportReceipt, ResultExporter};
