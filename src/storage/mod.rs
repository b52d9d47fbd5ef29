//! Object storage for archived gazette material.
//!
//! Every object lives under a date-scoped prefix and has a key that depends
//! only on the date, the kind of object and its identifier. That is what lets
//! the pipeline check for an object before uploading it.
//!
//! ## Key Layout
//!
//! ```text
//! dof/
//! └── 01-06-2024/
//!     ├── nota_7001.doc            # Notice source document
//!     ├── nota_7002.doc
//!     ├── diario_5001.pdf          # Full issue PDF
//!     └── diario_01-06-2024.json   # Manifest
//! ```

pub mod keys;
pub mod local;
#[cfg(test)]
pub(crate) mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::models::{StorageBackend, StorageConfig};

// Re-export for convenience
pub use keys::KeyLayout;
pub use local::LocalStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

pub const CONTENT_TYPE_DOC: &str = "application/msword";
pub const CONTENT_TYPE_PDF: &str = "application/pdf";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Options for a single upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: Option<&'static str>,
    /// Make the object world-readable
    pub public_read: bool,
}

impl PutOptions {
    pub fn new(content_type: &'static str) -> Self {
        Self {
            content_type: Some(content_type),
            public_read: false,
        }
    }

    pub fn public_read(mut self) -> Self {
        self.public_read = true;
        self
    }
}

/// Trait for object storage backends.
///
/// Writes are whole-object overwrites; there are no appends.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check whether `key` exists.
    ///
    /// `Ok(false)` means the backend positively reported the object missing;
    /// `Err` means the probe itself failed.
    async fn probe(&self, key: &str) -> Result<bool>;

    /// Upload `bytes` under `key`, replacing any previous object.
    async fn put_bytes(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> Result<()>;

    /// Human-readable location of `key`, used in logs.
    fn location(&self, key: &str) -> String;

    /// Existence check used to skip uploads.
    ///
    /// A failed probe counts as "does not exist": the worst case is a
    /// redundant overwrite at the same key, never a skipped object.
    async fn exists(&self, key: &str) -> bool {
        match self.probe(key).await {
            Ok(found) => found,
            Err(e) => {
                log::warn!(
                    "Existence probe failed for {}: {}. Treating as missing.",
                    self.location(key),
                    e
                );
                false
            }
        }
    }
}

/// Serialize `value` as compact JSON and upload it under `key`.
pub async fn put_json<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
    S: ObjectStore + ?Sized,
    T: Serialize + Sync + ?Sized,
{
    let bytes = serde_json::to_vec(value)?;
    store
        .put_bytes(key, bytes, &PutOptions::new(CONTENT_TYPE_JSON))
        .await
}

/// Open the backend selected by `config`.
pub async fn open(config: &StorageConfig) -> Result<Box<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Local => {
            log::info!("Using local storage at {}", config.local_root);
            Ok(Box::new(LocalStorage::new(&config.local_root)))
        }
        #[cfg(feature = "s3")]
        StorageBackend::S3 => Ok(Box::new(S3Storage::from_config(config).await?)),
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(crate::error::AppError::config(
            "S3 backend requires the `s3` feature",
        )),
    }
}
