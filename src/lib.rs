//! Messages API — list and append plain-text messages in a document store.

pub mod api;
pub mod config;
pub mod error;
pub mod store;
