//! Result type alias for Stockaudit
//!
//! This module provides a convenient Result type alias that uses AuditError
//! as the error type.

use super::errors::AuditError;

/// Result type alias for Stockaudit operations
///
/// # Examples
///
/// ```
/// use stockaudit::domain::result::Result;
/// use stockaudit::domain::errors::AuditError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(AuditError::InvalidInput("sample size must be > 0".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, AuditError>;
