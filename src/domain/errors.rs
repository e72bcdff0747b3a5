//! Domain error types
//!
//! This module defines the error hierarchy for Stockaudit.
//! Backend failures are wrapped in [`StoreError`] so no driver types leak
//! into the core.

use thiserror::Error;

/// Main Stockaudit error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Record store could not be reached within the handshake timeout
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// User-supplied audit parameters outside their allowed domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Analysis invoked on an empty input set
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Record store errors
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// Result export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Record store errors
///
/// Errors raised by a [`RecordStore`](crate::adapters::store::RecordStore)
/// backend. None of these are retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store
    #[error("Failed to connect to record store: {0}")]
    ConnectionFailed(String),

    /// Collection does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Failed to read documents
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Failed to update documents
    #[error("Update failed: {0}")]
    UpdateFailed(String),

    /// Failed to insert documents
    #[error("Insert failed: {0}")]
    InsertFailed(String),

    /// Pipeline could not be executed
    #[error("Pipeline failed: {0}")]
    PipelineFailed(String),

    /// A stored document is not a JSON object
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

impl AuditError {
    /// Process exit code for this error, matching the CLI conventions
    pub fn exit_code(&self) -> i32 {
        match self {
            AuditError::Configuration(_)
            | AuditError::InvalidInput(_)
            | AuditError::Validation(_) => 2,
            AuditError::Connectivity(_) | AuditError::Store(StoreError::ConnectionFailed(_)) => 4,
            _ => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        AuditError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AuditError {
    fn from(err: toml::de::Error) -> Self {
        AuditError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for AuditError {
    fn from(err: csv::Error) -> Self {
        AuditError::Export(err.to_string())
    }
}
