//! Local filesystem storage implementation.
//!
//! Mirrors the bucket layout on disk for development and testing.
//! Production deployments should use `S3Storage`.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── dof/
//!     └── DD-MM-YYYY/
//!         ├── nota_{codNota}.doc
//!         ├── diario_{codDiario}.pdf
//!         └── diario_DD-MM-YYYY.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{ObjectStore, PutOptions};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a key, refusing keys that escape the root.
    fn path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative.components().any(|c| {
            !matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir)
        });
        if escapes || key.is_empty() {
            return Err(AppError::validation(format!("Invalid storage key: {key}")));
        }
        Ok(self.root_dir.join(relative))
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key)?;
        self.ensure_dir(&path).await?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    pub async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    async fn probe(&self, key: &str) -> Result<bool> {
        let path = self.path(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn put_bytes(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> Result<()> {
        if options.public_read {
            log::debug!("public-read has no effect on local storage ({})", key);
        }
        self.write_bytes(key, &bytes).await?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), self.location(key));
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        self.root_dir.join(key).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::put_json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .put_bytes("dof/01-06-2024/nota_1.doc", b"hello".to_vec(), &PutOptions::default())
            .await
            .unwrap();
        let data = storage.read_bytes("dof/01-06-2024/nota_1.doc").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp.path().join("dof/01-06-2024/nota_1.doc.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let data = storage.read_bytes("nope.txt").await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_exists_after_put() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let key = "dof/01-06-2024/diario_5001.pdf";

        assert!(!storage.exists(key).await);
        storage
            .put_bytes(key, b"%PDF".to_vec(), &PutOptions::default())
            .await
            .unwrap();
        assert!(storage.exists(key).await);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let key = "dof/01-06-2024/diario_01-06-2024.json";

        put_json(&storage, key, &serde_json::json!({"fecha": "01-06-2024"}))
            .await
            .unwrap();
        put_json(&storage, key, &vec![1, 2, 3]).await.unwrap();

        let data = storage.read_bytes(key).await.unwrap().unwrap();
        assert_eq!(data, b"[1,2,3]");
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let result = storage
            .put_bytes("../outside.doc", b"x".to_vec(), &PutOptions::default())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        // a probe fault is reported as missing by the gateway
        assert!(!storage.exists("/etc/passwd").await);
    }
}
