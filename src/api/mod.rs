//! HTTP surface — one endpoint, dispatched on method alone.

pub mod handlers;
pub mod response;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;

use crate::store::MessageStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MessageStore>,
    /// Put raw storage error text in 500 bodies.
    pub expose_internal_errors: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self {
            store,
            expose_internal_errors: false,
        }
    }

    pub fn with_exposed_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }
}

/// Build the router. Every path and method lands in `dispatch`.
///
/// Message text has no length cap here; the hosting platform bounds the payload.
pub fn message_routes(state: AppState) -> Router {
    Router::new()
        .fallback(handlers::dispatch)
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
