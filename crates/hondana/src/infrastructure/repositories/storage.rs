use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use crate::domain::repositories::storage::{StorageRepository, StorageRepositoryError};

/// One JSON file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileStorageRepository {
    path: PathBuf,
}

impl FileStorageRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageRepositoryError> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)?;

        Ok(Self { path })
    }

    fn item_path(&self, key: &str) -> Result<PathBuf, StorageRepositoryError> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(StorageRepositoryError::Other(format!("invalid key {key:?}")));
        }

        Ok(self.path.join(format!("{key}.json")))
    }
}

impl StorageRepository for FileStorageRepository {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageRepositoryError> {
        match std::fs::read_to_string(self.item_path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageRepositoryError> {
        let path = self.item_path(key)?;
        // readers only ever see a whole record
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        Ok(())
    }
}

/// Process-local storage. Clones share the same items.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageRepository {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageRepository for MemoryStorageRepository {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageRepositoryError> {
        let items = self
            .items
            .read()
            .map_err(|e| StorageRepositoryError::Other(format!("{e}")))?;

        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageRepositoryError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StorageRepositoryError::Other(format!("{e}")))?;
        items.insert(key.to_string(), value.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileStorageRepository::new(dir.path().join("data")).unwrap();

        assert_eq!(repo.get_item("manga_progress").unwrap(), None);

        repo.set_item("manga_progress", r#"{"1":{}}"#).unwrap();
        repo.set_item("manga_progress", "{}").unwrap();
        assert_eq!(repo.get_item("manga_progress").unwrap().as_deref(), Some("{}"));
        assert!(dir.path().join("data").join("manga_progress.json").exists());
        assert!(!dir.path().join("data").join("manga_progress.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileStorageRepository::new(dir.path()).unwrap();

        assert!(repo.set_item("../escape", "x").is_err());
        assert!(repo.get_item("").is_err());
    }

    #[test]
    fn test_memory_storage_clones_share_items() {
        let repo = MemoryStorageRepository::new();
        let other = repo.clone();
        repo.set_item("manga_favorites", "[]").unwrap();
        assert_eq!(other.get_item("manga_favorites").unwrap().as_deref(), Some("[]"));
    }
}
