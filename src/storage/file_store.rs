use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError};

/// One file per key under a data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        // Write beside the target and rename so a crash never leaves half a value.
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{}.tmp", key));
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalPersistence, CHAT_MESSAGES_KEY};

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert!(store.get_item("webhookURL").unwrap().is_none());
    }

    #[test]
    fn test_set_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        store.set_item("webhookURL", "https://hook.example").unwrap();
        assert_eq!(
            store.get_item("webhookURL").unwrap().as_deref(),
            Some("https://hook.example")
        );
        assert!(!store.dir().join(".webhookURL.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CHAT_MESSAGES_KEY), "[{\"text\":").unwrap();
        let persistence = LocalPersistence::new(FileStore::new(dir.path()));
        assert!(persistence.load_messages().is_empty());
    }
}
