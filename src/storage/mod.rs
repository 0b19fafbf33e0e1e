//! Storage implementations.

use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{error, info};

use crate::config::StorageConfig;
use crate::interfaces::UserStore;

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteUserStore;

/// SQLite path that keeps the database in memory.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Initialize storage based on configuration.
///
/// Opens (creating if needed) the configured database, applies migrations
/// and returns the credential store.
pub async fn init_storage(
    config: &StorageConfig,
) -> Result<Arc<dyn UserStore>, Box<dyn std::error::Error>> {
    info!("Storage: {} at {}", config.storage_type, config.path);

    match config.storage_type.as_str() {
        "sqlite" => {
            if let Some(parent) = std::path::Path::new(&config.path).parent() {
                std::fs::create_dir_all(parent)?;
            }

            let options = SqliteConnectOptions::new()
                .filename(&config.path)
                .create_if_missing(true);
            // Every connection to ":memory:" opens its own database.
            let max_connections = if config.path == IN_MEMORY_PATH {
                1
            } else {
                config.max_connections
            };
            let pool = SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await?;

            let store = Arc::new(SqliteUserStore::new(pool));
            store.init_schema().await?;

            Ok(store)
        }
        other => {
            error!("Unknown storage type: {}", other);
            Err(format!("Unknown storage type: {}", other).into())
        }
    }
}
