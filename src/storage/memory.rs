//! In-memory object store for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::storage::{ObjectStore, PutOptions};

/// A recorded upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub key: String,
    pub public_read: bool,
    pub content_type: Option<&'static str>,
}

/// Keeps objects in a map and records every upload in order.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    uploads: Mutex<Vec<Upload>>,
    failing_probes: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every probe of `key` fail.
    pub fn fail_probe(&self, key: &str) {
        self.failing_probes.lock().unwrap().insert(key.to_string());
    }

    pub fn insert(&self, key: &str, bytes: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads().into_iter().map(|u| u.key).collect()
    }

    pub fn clear_uploads(&self) {
        self.uploads.lock().unwrap().clear();
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn probe(&self, key: &str) -> Result<bool> {
        if self.failing_probes.lock().unwrap().contains(key) {
            return Err(AppError::s3("probe timed out"));
        }
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn put_bytes(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> Result<()> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        self.uploads.lock().unwrap().push(Upload {
            key: key.to_string(),
            public_read: options.public_read,
            content_type: options.content_type,
        });
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}
