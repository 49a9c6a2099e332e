use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageRepositoryError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("other error: {0}")]
    Other(String),
}

/// Durable string key-value storage, one value per key, always written whole.
pub trait StorageRepository: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageRepositoryError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageRepositoryError>;
}
