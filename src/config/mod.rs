//! Configuration management for Stockaudit.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `STOCKAUDIT_*`
//! environment overrides, defaults for every optional setting, and
//! validation on load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stockaudit::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("stockaudit.toml")?;
//!
//! println!("Backend: {:?}", config.store_backend);
//! println!("Sample size: {}", config.audit.sample_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`MemoryConfig`] - JSON snapshot directory for the in-memory store
//! - [`PostgreSQLConfig`] - connection pool and timeouts
//! - [`AuditConfig`] - default collection, sample size, threshold, sampling
//! - [`NormalizedConfig`] - normalized schema collection names
//! - [`ExportConfig`] - output directory, delimiter, checksums
//! - [`LoggingConfig`] - JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! store_backend = "postgresql"
//!
//! [postgresql]
//! connection_string = "${STOCKAUDIT_DSN}"
//!
//! [audit]
//! collection = "Storage"
//! sample_size = 25
//! threshold = 1000.0
//! criterion = "high_value"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_str};
pub use schema::{
    default_connection_timeout_seconds, ApplicationConfig, AuditConfig, ExportConfig, LoggingConfig, MemoryConfig, NormalizedConfig,
    PostgreSQLConfig, SamplingStrategy, StockauditConfig, StoreBackend,
};
pub use secret::{secret_string, SecretString, SecretValue};
