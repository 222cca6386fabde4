//! Method dispatch plus the list and append operations.

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::Method;
use axum::response::Response;
use serde_json::Value;
use tracing::debug;

use super::AppState;
use super::response::{error_response, message_json, messages_json, success};
use crate::error::{ApiError, DatabaseError};
use crate::store::{Message, MessageStore};

/// Single entry point for every request, regardless of path.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match method {
        Method::GET => list_messages(state.store.as_ref())
            .await
            .map(|messages| success(messages_json(&messages))),
        Method::POST => match body {
            Ok(body) => append_message(state.store.as_ref(), &body)
                .await
                .map(|message| success(message_json(&message))),
            Err(rejection) => Err(ApiError::UnreadableBody(rejection)),
        },
        other => {
            debug!(method = %other, "Rejecting unsupported method");
            Err(ApiError::MethodNotAllowed)
        }
    };

    result.unwrap_or_else(|err| error_response(err, state.expose_internal_errors))
}

/// Every stored message.
pub async fn list_messages(store: &dyn MessageStore) -> Result<Vec<Message>, ApiError> {
    Ok(store.list_messages().await?)
}

/// Validate the body, insert, and return the stored document as re-read by id.
pub async fn append_message(store: &dyn MessageStore, body: &[u8]) -> Result<Message, ApiError> {
    let text = extract_message(body)?;

    let id = store.insert_message(&text).await?;
    let stored = store
        .get_message(&id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "message".to_string(),
            id: id.to_hex(),
        })?;

    debug!(id = %stored.id, "Message appended");
    Ok(stored)
}

/// Pull a non-empty `message` string out of a JSON object body.
fn extract_message(body: &[u8]) -> Result<String, ApiError> {
    let value: Value = serde_json::from_slice(body)?;
    match value.get("message") {
        Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
        _ => Err(ApiError::MissingMessage),
    }
}
