//! Record store factory
//!
//! This module provides factory functions to create record stores based on
//! configuration.

use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::{PostgreSQLClient, PostgreSQLStore};
use crate::adapters::store::RecordStore;
use crate::config::{default_connection_timeout_seconds, StockauditConfig, StoreBackend};
use crate::domain::{AuditError, Result, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// Create a record store based on the configuration
///
/// No connection is attempted here; see [`connect`].
///
/// # Errors
///
/// Returns an error if the backend section is missing or invalid, or if
/// memory snapshots cannot be loaded.
pub async fn create_record_store(config: &StockauditConfig) -> Result<Arc<dyn RecordStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Creating memory record store");
            let store = MemoryStore::open(&config.memory).await?;
            Ok(Arc::new(store) as Arc<dyn RecordStore>)
        }
        StoreBackend::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                AuditError::Configuration(
                    "store_backend is postgresql but [postgresql] is not configured".to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL record store");
            let client = PostgreSQLClient::new(pg_config.clone())?;
            Ok(Arc::new(PostgreSQLStore::new(client)) as Arc<dyn RecordStore>)
        }
    }
}

/// Handshake timeout for the configured backend
pub fn handshake_timeout(config: &StockauditConfig) -> Duration {
    let seconds = match (&config.store_backend, &config.postgresql) {
        (StoreBackend::PostgreSQL, Some(pg)) => pg.connection_timeout_seconds,
        _ => default_connection_timeout_seconds(),
    };
    Duration::from_secs(seconds)
}

/// Verifies the store answers within `timeout`
///
/// # Errors
///
/// Returns [`AuditError::Connectivity`] on timeout or connection failure.
/// Other store errors are returned unchanged.
pub async fn verify_connection(store: &dyn RecordStore, timeout: Duration) -> Result<()> {
    match tokio::time::timeout(timeout, store.test_connection()).await {
        Err(_) => Err(AuditError::Connectivity(format!(
            "{} store did not respond within {}s",
            store.backend_name(),
            timeout.as_secs()
        ))),
        Ok(Err(AuditError::Store(StoreError::ConnectionFailed(msg)))) => {
            Err(AuditError::Connectivity(msg))
        }
        Ok(result) => result,
    }
}

/// Creates the configured store and verifies it is reachable
///
/// # Errors
///
/// Returns [`AuditError::Connectivity`] if the handshake fails or times out.
pub async fn connect(config: &StockauditConfig) -> Result<Arc<dyn RecordStore>> {
    let store = create_record_store(config).await?;
    verify_connection(store.as_ref(), handshake_timeout(config)).await?;
    tracing::info!(backend = store.backend_name(), "Record store connected");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_string, PostgreSQLConfig};

    #[tokio::test]
    async fn test_connect_memory() {
        let config = StockauditConfig::default();
        let store = connect(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_postgresql_without_section_is_configuration_error() {
        let config = StockauditConfig {
            store_backend: StoreBackend::PostgreSQL,
            ..Default::default()
        };
        let result = create_record_store(&config).await;
        assert!(matches!(result, Err(AuditError::Configuration(_))));
    }

    #[test]
    fn test_handshake_timeout() {
        let mut config = StockauditConfig::default();
        assert_eq!(handshake_timeout(&config), Duration::from_secs(20));

        config.store_backend = StoreBackend::PostgreSQL;
        config.postgresql = Some(PostgreSQLConfig {
            connection_string: secret_string("postgresql://localhost/db".to_string()),
            max_connections: 2,
            connection_timeout_seconds: 3,
            statement_timeout_seconds: 10,
        });
        assert_eq!(handshake_timeout(&config), Duration::from_secs(3));
    }
}
