//! Logging and observability
//!
//! Structured logging with:
//! - console output on stderr
//! - configurable log levels (`RUST_LOG` wins)
//! - JSON log files with rotation
//!
//! # Example
//!
//! ```no_run
//! use stockaudit::logging::init_logging;
//! use stockaudit::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(collection = "Storage", "Audit started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an audit
///
/// # Example
///
/// ```no_run
/// use stockaudit::log_audit_start;
///
/// log_audit_start!("Storage", 25, "extendedValue > 1000");
/// ```
#[macro_export]
macro_rules! log_audit_start {
    ($collection:expr, $sample_size:expr, $threshold:expr) => {
        tracing::info!(
            collection = %$collection,
            sample_size = %$sample_size,
            threshold = %$threshold,
            "Starting audit"
        );
    };
}

/// Log the completion of an audit
///
/// # Example
///
/// ```no_run
/// use stockaudit::log_audit_complete;
/// use std::time::Duration;
///
/// log_audit_complete!("Storage", 120, 25, Duration::from_millis(40));
/// ```
#[macro_export]
macro_rules! log_audit_complete {
    ($collection:expr, $candidates:expr, $sampled:expr, $duration:expr) => {
        tracing::info!(
            collection = %$collection,
            candidates = $candidates,
            sampled = $sampled,
            duration_ms = $duration.as_millis() as u64,
            "Audit completed"
        );
    };
}

/// Log one integrity check, as a warning when it did not pass
///
/// # Example
///
/// ```no_run
/// use stockaudit::log_check_result;
/// use stockaudit::core::integrity::CheckResult;
///
/// let result = CheckResult::new("Missing Price", 2, 10);
/// log_check_result!("Storage", result);
/// ```
#[macro_export]
macro_rules! log_check_result {
    ($collection:expr, $result:expr) => {
        if $result.passed() {
            tracing::debug!(
                collection = %$collection,
                check = %$result.label,
                count = $result.count,
                "Integrity check passed"
            );
        } else {
            tracing::warn!(
                collection = %$collection,
                check = %$result.label,
                count = $result.count,
                percent = format!("{:.1}", $result.percent),
                "Integrity check flagged records"
            );
        }
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use stockaudit::log_error_with_context;
/// use stockaudit::domain::AuditError;
///
/// let error = AuditError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
