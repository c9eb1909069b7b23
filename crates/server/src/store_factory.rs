use std::sync::Arc;

use pantry_store::{ItemStore, UserStore};
use pantry_store_memory::{MemoryItemStore, MemoryUserStore};
#[cfg(feature = "postgres")]
use pantry_store_postgres::{PostgresConfig, PostgresItemStore, PostgresUserStore};

use crate::config::StoreConfig;
use crate::error::ServerError;

/// An item store and user store pair sharing one backend.
pub type StorePair = (Arc<dyn ItemStore>, Arc<dyn UserStore>);

/// Construct the item and user stores from configuration.
pub async fn create_stores(config: &StoreConfig) -> Result<StorePair, ServerError> {
    match config.backend.as_str() {
        "memory" => Ok(create_memory()),
        #[cfg(feature = "postgres")]
        "postgres" => create_postgres(config).await,
        other => Err(ServerError::Config(format!(
            "unsupported store backend: {other} (is the feature enabled?)"
        ))),
    }
}

fn create_memory() -> StorePair {
    let items = Arc::new(MemoryItemStore::new());
    let users = Arc::new(MemoryUserStore::new());
    (items, users)
}

#[cfg(feature = "postgres")]
async fn create_postgres(config: &StoreConfig) -> Result<StorePair, ServerError> {
    let url = config
        .url
        .as_deref()
        .unwrap_or("postgres://localhost:5432/pantry");
    let mut pg_config = PostgresConfig::new(url);
    if let Some(prefix) = &config.prefix {
        pg_config = pg_config.with_prefix(prefix.clone());
    }
    if let Some(pool_size) = config.pool_size {
        pg_config = pg_config.with_pool_size(pool_size);
    }
    let pool = pantry_store_postgres::connect(&pg_config)
        .await
        .map_err(|e| ServerError::Config(format!("postgres store: {e}")))?;
    let items = Arc::new(PostgresItemStore::from_pool(pool.clone(), &pg_config));
    let users = Arc::new(PostgresUserStore::from_pool(pool, &pg_config));
    Ok((items, users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_is_default() {
        let (items, _users) = create_stores(&StoreConfig::default()).await.unwrap();
        assert_eq!(items.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_backend_is_config_error() {
        let config = StoreConfig {
            backend: "mongodb".into(),
            ..StoreConfig::default()
        };
        let err = create_stores(&config).await.err().unwrap();
        assert!(matches!(err, ServerError::Config(msg) if msg.contains("mongodb")));
    }
}
