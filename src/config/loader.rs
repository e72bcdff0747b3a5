//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{SamplingStrategy, StockauditConfig, StoreBackend};
use super::secret_string;
use crate::core::threshold::ThresholdCriterion;
use crate::domain::errors::AuditError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Prefix shared by every override variable
pub const ENV_PREFIX: &str = "STOCKAUDIT_";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into StockauditConfig
/// 4. Applies environment variable overrides (STOCKAUDIT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use stockaudit::config::loader::load_config;
///
/// let config = load_config("stockaudit.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<StockauditConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AuditError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AuditError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same pipeline as [`load_config`] minus the file read.
pub fn load_config_str(contents: &str) -> Result<StockauditConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: StockauditConfig = toml::from_str(&contents)
        .map_err(|e| AuditError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        AuditError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| AuditError::Other(format!("invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|m| m == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(AuditError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

fn env_parsed<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            AuditError::Configuration(format!(
                "Invalid value '{raw}' for environment variable {ENV_PREFIX}{key}"
            ))
        }),
    }
}

/// Applies environment variable overrides using the STOCKAUDIT_* prefix
///
/// Environment variables follow the pattern: STOCKAUDIT_<SECTION>_<KEY>,
/// for example STOCKAUDIT_AUDIT_SAMPLE_SIZE. Unparseable values are
/// configuration errors.
fn apply_env_overrides(config: &mut StockauditConfig) -> Result<()> {
    if let Some(val) = env("STORE_BACKEND") {
        config.store_backend = match val.to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "postgresql" => StoreBackend::PostgreSQL,
            other => {
                return Err(AuditError::Configuration(format!(
                    "Invalid {ENV_PREFIX}STORE_BACKEND '{other}'. Must be one of: memory, postgresql"
                )))
            }
        };
    }

    // Application overrides
    if let Some(val) = env("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parsed("APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Memory store overrides
    if let Some(val) = env("MEMORY_DATA_DIR") {
        config.memory.data_dir = Some(val);
    }
    if let Some(val) = env_parsed("MEMORY_PERSIST")? {
        config.memory.persist = val;
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg_config) = config.postgresql {
        if let Some(val) = env("POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Some(val) = env_parsed("POSTGRESQL_MAX_CONNECTIONS")? {
            pg_config.max_connections = val;
        }
        if let Some(val) = env_parsed("POSTGRESQL_CONNECTION_TIMEOUT_SECONDS")? {
            pg_config.connection_timeout_seconds = val;
        }
    }

    // Audit overrides
    if let Some(val) = env("AUDIT_COLLECTION") {
        config.audit.collection = Some(val);
    }
    if let Some(val) = env_parsed("AUDIT_SAMPLE_SIZE")? {
        config.audit.sample_size = val;
    }
    if let Some(val) = env_parsed("AUDIT_THRESHOLD")? {
        config.audit.threshold = val;
    }
    if let Some(val) = env("AUDIT_CRITERION") {
        config.audit.criterion = ThresholdCriterion::from_str(&val)
            .map_err(|e| AuditError::Configuration(format!("{ENV_PREFIX}AUDIT_CRITERION: {e}")))?;
    }
    if let Some(val) = env("AUDIT_SAMPLING") {
        config.audit.sampling = match val.to_ascii_lowercase().as_str() {
            "client" => SamplingStrategy::Client,
            "store" => SamplingStrategy::Store,
            other => {
                return Err(AuditError::Configuration(format!(
                    "Invalid {ENV_PREFIX}AUDIT_SAMPLING '{other}'. Must be one of: client, store"
                )))
            }
        };
    }
    if let Some(val) = env_parsed("AUDIT_SEED")? {
        config.audit.seed = Some(val);
    }

    if let Some(val) = env_parsed("NORMALIZED_MAX_TAG_SPAN")? {
        config.normalized.max_tag_span = val;
    }

    // Export overrides
    if let Some(val) = env("EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }
    if let Some(val) = env_parsed("EXPORT_DELIMITER")? {
        config.export.delimiter = val;
    }

    // Logging overrides
    if let Some(val) = env_parsed("LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
