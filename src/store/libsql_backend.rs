//! libSQL backend — embedded `MessageStore` for local runs and tests.
//!
//! Stores the same `{ id, message }` document shape as the MongoDB backend,
//! one row per document. Ids are generated as ObjectIds so both backends
//! hand out identifiers in the same format.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database as LibSqlDatabase, params};
use mongodb::bson::oid::ObjectId;
use tracing::{debug, info, warn};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{Message, MessageStore};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database.
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;

        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Map a libsql Row (`id, message`) to a Message.
fn row_to_message(row: &libsql::Row) -> Result<Message, DatabaseError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
    let id = ObjectId::parse_str(&id_str)
        .map_err(|e| DatabaseError::Serialization(format!("bad message id {id_str:?}: {e}")))?;
    let message: String = row.get(1).unwrap_or_default();
    Ok(Message { id, message })
}

#[async_trait]
impl MessageStore for LibSqlBackend {
    fn backend_name(&self) -> &'static str {
        "libsql"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.conn()
            .query("SELECT 1", ())
            .await
            .map_err(|e| DatabaseError::Pool(format!("ping: {e}")))?;
        Ok(())
    }

    async fn list_messages(&self) -> Result<Vec<Message>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT id, message FROM messages ORDER BY seq ASC", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("list_messages: {e}")))?;

        let mut messages = Vec::new();
        loop {
            let row = rows
                .next()
                .await
                .map_err(|e| DatabaseError::Query(format!("list_messages: {e}")))?;
            let Some(row) = row else { break };
            match row_to_message(&row) {
                Ok(msg) => messages.push(msg),
                Err(e) => warn!("Skipping message row: {e}"),
            }
        }
        Ok(messages)
    }

    async fn insert_message(&self, text: &str) -> Result<ObjectId, DatabaseError> {
        let id = ObjectId::new();
        self.conn()
            .execute(
                "INSERT INTO messages (id, message) VALUES (?1, ?2)",
                params![id.to_hex(), text],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_message: {e}")))?;

        debug!(id = %id, "Message inserted into DB");
        Ok(id)
    }

    async fn get_message(&self, id: &ObjectId) -> Result<Option<Message>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, message FROM messages WHERE id = ?1",
                params![id.to_hex()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_message: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_message(&row).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_message: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    #[tokio::test]
    async fn list_empty() {
        let db = test_db().await;
        assert!(db.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_and_get_by_id() {
        let db = test_db().await;
        let id = db.insert_message("hello world").await.unwrap();

        let fetched = db.get_message(&id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.message, "hello world");
    }

    #[tokio::test]
    async fn get_by_id_not_found() {
        let db = test_db().await;
        let result = db.get_message(&ObjectId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let db = test_db().await;
        let first = db.insert_message("first").await.unwrap();
        let second = db.insert_message("second").await.unwrap();
        let third = db.insert_message("third").await.unwrap();

        let ids: Vec<ObjectId> = db
            .list_messages()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[tokio::test]
    async fn identical_text_gets_distinct_ids() {
        let db = test_db().await;
        let a = db.insert_message("same").await.unwrap();
        let b = db.insert_message("same").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(db.list_messages().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let db = test_db().await;
        db.insert_message("good").await.unwrap();
        db.conn()
            .execute(
                "INSERT INTO messages (id, message) VALUES ('not-an-object-id', 'bad')",
                (),
            )
            .await
            .unwrap();

        let messages = db.list_messages().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "good");
    }

    #[tokio::test]
    async fn ping_succeeds() {
        let db = test_db().await;
        db.ping().await.unwrap();
        assert_eq!(db.backend_name(), "libsql");
    }

    #[tokio::test]
    async fn file_database_persists_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("messages.db");

        let id = {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            db.insert_message("kept").await.unwrap()
        };
        assert!(path.exists());

        let reopened = LibSqlBackend::new_local(&path).await.unwrap();
        let fetched = reopened.get_message(&id).await.unwrap().unwrap();
        assert_eq!(fetched.message, "kept");
    }
}
