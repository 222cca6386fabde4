//! Persistence layer — the `messages` collection behind one async trait.

pub mod libsql_backend;
pub mod migrations;
pub mod mongo_backend;
pub mod traits;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

pub use libsql_backend::LibSqlBackend;
pub use mongo_backend::MongoBackend;
pub use traits::{MESSAGES_COLLECTION, Message, MessageStore};

use crate::config::{ApiConfig, StoreKind};
use crate::error::DatabaseError;

/// Open the backend named by the config. Called once per process.
pub async fn connect(config: &ApiConfig) -> Result<Arc<dyn MessageStore>, DatabaseError> {
    let store: Arc<dyn MessageStore> = match &config.store_kind {
        StoreKind::Mongo => Arc::new(
            MongoBackend::connect(config.database_url(), &config.database_name).await?,
        ),
        StoreKind::LibSqlMemory => Arc::new(LibSqlBackend::new_memory().await?),
        StoreKind::LibSqlFile(path) => Arc::new(LibSqlBackend::new_local(Path::new(path)).await?),
    };
    info!(backend = store.backend_name(), "Message store ready");
    Ok(store)
}
