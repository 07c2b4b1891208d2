use super::{KeyValueStore, StorageError};

/// `window.localStorage`.
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    pub fn local() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("window not available".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Quota errors surface here as a DOMException.
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Rejected(format!("{:?}", e)))
    }
}
