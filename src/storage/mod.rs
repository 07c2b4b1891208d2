//! Synchronous key-value persistence of the webhook URL, chat history and
//! category list.
//!
//! Saves are best-effort: a failed write is logged and reported through
//! [`SaveOutcome`], which callers are free to drop. Loads never fail; a
//! missing, unreadable or malformed slot yields an empty default, and
//! individual history entries that cannot be parsed are skipped.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::types::{Category, ChatMessage};

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(not(target_arch = "wasm32"))]
mod file_store;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStorage;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;

pub const WEBHOOK_URL_KEY: &str = "webhookURL";
pub const CHAT_MESSAGES_KEY: &str = "chatMessages";
pub const CATEGORIES_KEY: &str = "categories";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available: {0}")]
    Unavailable(String),
    #[error("storage rejected the write: {0}")]
    Rejected(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize value: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A string-to-string store with the shape of the browser's `localStorage`.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

/// Result of a best-effort write. Not `#[must_use]`; the failure has
/// already been logged when this is returned.
#[derive(Debug)]
pub enum SaveOutcome {
    Stored,
    Failed(StorageError),
}

impl SaveOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, SaveOutcome::Stored)
    }
}

/// In-process store, used when no persistent store can be opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads and writes `primary` when it could be opened, otherwise a memory
/// store that lives for the session. Writes that land in memory still fail
/// with [`StorageError::Unavailable`] since nothing was persisted.
pub struct FallbackStore<'a, S> {
    primary: Option<S>,
    memory: &'a MemoryStore,
}

impl<'a, S> FallbackStore<'a, S> {
    pub fn new(primary: Option<S>, memory: &'a MemoryStore) -> Self {
        Self { primary, memory }
    }

    pub fn is_persistent(&self) -> bool {
        self.primary.is_some()
    }
}

impl<S: KeyValueStore> KeyValueStore for FallbackStore<'_, S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match &self.primary {
            Some(primary) => primary.get_item(key),
            None => self.memory.get_item(key),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match &self.primary {
            Some(primary) => primary.set_item(key, value),
            None => {
                self.memory.set_item(key, value)?;
                Err(StorageError::Unavailable(
                    "kept in memory for this session only".to_string(),
                ))
            }
        }
    }
}

pub struct LocalPersistence<S> {
    store: S,
}

impl<S: KeyValueStore> LocalPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save_webhook_url(&self, url: &str) -> SaveOutcome {
        let result = self.store.set_item(WEBHOOK_URL_KEY, url);
        self.finish_save(result, "webhook URL")
    }

    /// The stored URL, or an empty string when none is set.
    pub fn load_webhook_url(&self) -> String {
        match self.store.get_item(WEBHOOK_URL_KEY) {
            Ok(url) => url.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to load webhook URL: {}", e);
                String::new()
            }
        }
    }

    pub fn save_messages(&self, messages: &[ChatMessage]) -> SaveOutcome {
        self.save_json(CHAT_MESSAGES_KEY, messages, "chat messages")
    }

    pub fn load_messages(&self) -> Vec<ChatMessage> {
        self.load_json_array(CHAT_MESSAGES_KEY, "chat messages")
    }

    /// Appends to the stored history and writes the whole batch back.
    pub fn append_message(&self, message: ChatMessage) -> SaveOutcome {
        let mut messages = self.load_messages();
        messages.push(message);
        self.save_messages(&messages)
    }

    pub fn save_categories(&self, categories: &[Category]) -> SaveOutcome {
        self.save_json(CATEGORIES_KEY, categories, "categories")
    }

    pub fn load_categories(&self) -> Vec<Category> {
        self.load_json_array(CATEGORIES_KEY, "categories")
    }

    /// Adds `label` at the end of the list unless it is already present.
    pub fn add_category(&self, label: &str) -> SaveOutcome {
        let mut categories = self.load_categories();
        if categories.iter().any(|c| c == label) {
            return SaveOutcome::Stored;
        }
        categories.push(label.to_string());
        self.save_categories(&categories)
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T, what: &str) -> SaveOutcome {
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|raw| self.store.set_item(key, &raw));
        self.finish_save(result, what)
    }

    fn finish_save(&self, result: Result<(), StorageError>, what: &str) -> SaveOutcome {
        match result {
            Ok(()) => SaveOutcome::Stored,
            Err(e) => {
                tracing::error!("Failed to save {}: {}", what, e);
                SaveOutcome::Failed(e)
            }
        }
    }

    fn load_json_array<T: DeserializeOwned>(&self, key: &str, what: &str) -> Vec<T> {
        let raw = match self.store.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", what, e);
                return Vec::new();
            }
        };

        // A slot that is not an array reads as empty; inside an array only the
        // entries that fail to parse are dropped.
        let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Discarding stored {}: {}", what, e);
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!("Skipping a stored {} entry: {}", what, e);
                    None
                }
            })
            .collect()
    }
}
