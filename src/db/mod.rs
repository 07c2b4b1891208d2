//! Asynchronous store for the webhook URL, kept apart from the key-value
//! slots in [`crate::storage`]. The two stores are not reconciled.
//!
//! Layout: database `WebhooksDB` at version 1 holding one record store,
//! `webhookStore`, keyed by `id`, with a single record
//! `{ id: "webhook", url }`. Each call opens its own connection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
mod indexed_db;
#[cfg(not(target_arch = "wasm32"))]
mod sqlite;

#[cfg(target_arch = "wasm32")]
pub use indexed_db::WebhookDb;
#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::WebhookDb;

pub const DB_NAME: &str = "WebhooksDB";
pub const DB_VERSION: u32 = 1;
pub const STORE_NAME: &str = "webhookStore";
pub const RECORD_ID: &str = "webhook";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRecord {
    pub id: String,
    pub url: String,
}

impl WebhookRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: RECORD_ID.to_string(),
            url: url.into(),
        }
    }
}

/// Each variant keeps the engine's own description of what went wrong.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("Database connection error.")]
    Connection(String),
    #[error("Failed to load webhook URL.")]
    Load(String),
    #[error("Failed to save webhook URL.")]
    Save(String),
}

impl DatabaseError {
    pub fn reason(&self) -> &str {
        match self {
            DatabaseError::Connection(reason)
            | DatabaseError::Load(reason)
            | DatabaseError::Save(reason) => reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DatabaseError::Connection("disk I/O error".to_string());
        assert_eq!(err.to_string(), "Database connection error.");
        assert_eq!(err.reason(), "disk I/O error");
        assert_eq!(
            DatabaseError::Load(String::new()).to_string(),
            "Failed to load webhook URL."
        );
        assert_eq!(
            DatabaseError::Save(String::new()).to_string(),
            "Failed to save webhook URL."
        );
    }

    #[test]
    fn test_record_shape() {
        let value = serde_json::to_value(WebhookRecord::new("https://hook.example")).unwrap();
        assert_eq!(value, serde_json::json!({ "id": "webhook", "url": "https://hook.example" }));
    }
}
