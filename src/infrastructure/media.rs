//! File storage collaborator for product images
//!
//! Upload and resizing happen in an external processing step; this service
//! only records image rows and removes the named files when listings or
//! images are deleted.

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::domain::DomainError;

/// Removes stored image files by name
#[async_trait]
pub trait FileStore: Send + Sync + Debug {
    /// Remove a stored file. Missing files are not an error: a cleanup that
    /// finds nothing to clean has succeeded.
    async fn remove(&self, file_name: &str) -> Result<(), DomainError>;
}

/// File store rooted at a local uploads directory
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn remove(&self, file_name: &str) -> Result<(), DomainError> {
        let path = self.root.join(file_name);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to remove file '{}': {}",
                path.display(),
                e
            ))),
        }
    }
}

/// File store that does nothing, for tests and deployments where an external
/// process owns file lifecycle
#[derive(Debug, Clone, Default)]
pub struct NoopFileStore;

#[async_trait]
impl FileStore for NoopFileStore {
    async fn remove(&self, _file_name: &str) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_removes_file() {
        let dir = std::env::temp_dir().join("campus-market-media-test");
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let path = dir.join("image.jpg");
        tokio::fs::write(&path, b"bytes").await.unwrap();

        let store = LocalFileStore::new(&dir);
        store.remove("image.jpg").await.unwrap();

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_local_store_ignores_missing_file() {
        let dir = std::env::temp_dir().join("campus-market-media-test");
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let store = LocalFileStore::new(&dir);
        assert!(store.remove("does-not-exist.jpg").await.is_ok());
    }
}
