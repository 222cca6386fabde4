//! MongoDB backend — the production `MessageStore`.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Document, doc};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::DatabaseError;
use crate::store::traits::{MESSAGES_COLLECTION, Message, MessageStore};

/// On-disk document shape. `_id` is left to the driver on insert.
#[derive(Debug, Serialize, Deserialize)]
struct MessageDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(default)]
    message: String,
}

impl MessageDocument {
    fn into_message(self) -> Result<Message, DatabaseError> {
        let id = self
            .id
            .ok_or_else(|| DatabaseError::Serialization("document has no _id".to_string()))?;
        Ok(Message {
            id,
            message: self.message,
        })
    }
}

/// Decode raw documents one at a time, skipping any that don't fit the shape.
fn decode_documents(raw: Vec<Document>) -> Vec<Message> {
    raw.into_iter()
        .filter_map(|document| {
            bson::from_document::<MessageDocument>(document)
                .map_err(|e| DatabaseError::Serialization(e.to_string()))
                .and_then(MessageDocument::into_message)
                .map_err(|e| warn!("Skipping message document: {e}"))
                .ok()
        })
        .collect()
}

/// MongoDB database backend.
///
/// `Client` pools connections internally and is cheap to share, so one
/// handle serves every request for the life of the process.
pub struct MongoBackend {
    db: Database,
    collection: Collection<MessageDocument>,
}

impl MongoBackend {
    /// Connect and verify the server answers a `ping`.
    pub async fn connect(url: &str, database_name: &str) -> Result<Self, DatabaseError> {
        let client = Client::with_uri_str(url)
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to create MongoDB client: {e}")))?;

        let db = client.database(database_name);
        let collection = db.collection::<MessageDocument>(MESSAGES_COLLECTION);
        let backend = Self { db, collection };

        backend.ping().await?;
        info!(database = database_name, "MongoDB connected");
        Ok(backend)
    }
}

#[async_trait]
impl MessageStore for MongoBackend {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DatabaseError::Pool(format!("ping: {e}")))?;
        Ok(())
    }

    async fn list_messages(&self) -> Result<Vec<Message>, DatabaseError> {
        let raw: Vec<Document> = self
            .collection
            .clone_with_type::<Document>()
            .find(doc! {})
            .await
            .map_err(|e| DatabaseError::Query(format!("list_messages: {e}")))?
            .try_collect()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_messages: {e}")))?;

        Ok(decode_documents(raw))
    }

    async fn insert_message(&self, text: &str) -> Result<ObjectId, DatabaseError> {
        let document = MessageDocument {
            id: None,
            message: text.to_string(),
        };
        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_message: {e}")))?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            DatabaseError::Serialization(format!(
                "insert_message: inserted id is not an ObjectId: {}",
                result.inserted_id
            ))
        })?;

        debug!(id = %id, "Message inserted into DB");
        Ok(id)
    }

    async fn get_message(&self, id: &ObjectId) -> Result<Option<Message>, DatabaseError> {
        let document = self
            .collection
            .find_one(doc! { "_id": *id })
            .await
            .map_err(|e| DatabaseError::Query(format!("get_message: {e}")))?;

        document.map(MessageDocument::into_message).transpose()
    }
}
