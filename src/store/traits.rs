//! `MessageStore` trait — single async interface over the document store.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::DatabaseError;

/// Name of the collection (or table) holding messages.
pub const MESSAGES_COLLECTION: &str = "messages";

/// A persisted message document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Storage-assigned identifier.
    pub id: ObjectId,
    pub message: String,
}

/// Backend-agnostic message storage.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Round-trip to the database to verify it is reachable.
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// All messages, in the engine's natural order.
    async fn list_messages(&self) -> Result<Vec<Message>, DatabaseError>;

    /// Insert a new message. Returns the storage-assigned id.
    async fn insert_message(&self, text: &str) -> Result<ObjectId, DatabaseError>;

    /// Look up a message by id.
    async fn get_message(&self, id: &ObjectId) -> Result<Option<Message>, DatabaseError>;
}
