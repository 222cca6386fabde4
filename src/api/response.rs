//! Response encoding for the messages endpoint.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::error;

use crate::error::ApiError;
use crate::store::Message;

const GENERIC_INTERNAL_ERROR: &str = "Internal server error";

/// Render one message as `{"_id": "<hex>", "id": "<hex>", "message": "<text>"}`.
///
/// `_id` is the key browser clients poll on to skip messages they already
/// drew; `id` carries the same value.
pub fn message_json(message: &Message) -> Value {
    let id = message.id.to_hex();
    json!({
        "_id": id,
        "id": id,
        "message": message.message,
    })
}

/// Render a list of messages as a JSON array.
pub fn messages_json(messages: &[Message]) -> Value {
    Value::Array(messages.iter().map(message_json).collect())
}

/// 200 with a JSON body plus content-type and wildcard CORS headers.
pub fn success(body: Value) -> Response {
    let mut response = (StatusCode::OK, body.to_string()).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

impl ApiError {
    /// HTTP status for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingMessage | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::UnreadableBody(rejection) => rejection.status(),
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `error` field of the response body.
    fn public_message(&self, expose_internal: bool) -> String {
        match self {
            ApiError::MethodNotAllowed | ApiError::MissingMessage => self.to_string(),
            ApiError::InvalidJson(_) => "Invalid JSON body".to_string(),
            ApiError::UnreadableBody(_) => "Failed to read request body".to_string(),
            ApiError::Storage(e) if expose_internal => e.to_string(),
            ApiError::Storage(_) => GENERIC_INTERNAL_ERROR.to_string(),
        }
    }
}

/// Build the `{"error": ...}` response for an error. No CORS header.
pub fn error_response(err: ApiError, expose_internal: bool) -> Response {
    let status = err.status();
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    }
    (
        status,
        Json(json!({ "error": err.public_message(expose_internal) })),
    )
        .into_response()
}
