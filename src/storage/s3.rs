//! AWS S3 storage implementation.
//!
//! Objects are written with a single `PutObject` each; large-object
//! chunking is left to the SDK. Notice documents are published with the
//! `public-read` canned ACL.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use crate::error::{AppError, Result};
use crate::models::StorageConfig;
use crate::storage::{ObjectStore, PutOptions};

/// S3-backed object store.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Create S3 storage using the default AWS credential chain.
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        if config.bucket.trim().is_empty() {
            return Err(AppError::config("storage.bucket is empty"));
        }
        let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&aws);

        log::info!("Using S3 bucket {}", config.bucket);
        Ok(Self::new(client, config.bucket.clone()))
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn probe(&self, key: &str) -> Result<bool> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(AppError::s3(service_err))
                }
            }
        }
    }

    async fn put_bytes(&self, key: &str, bytes: Vec<u8>, options: &PutOptions) -> Result<()> {
        let size = bytes.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes));

        if let Some(content_type) = options.content_type {
            request = request.content_type(content_type);
        }
        if options.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request.send().await.map_err(AppError::s3)?;

        log::info!("Wrote {} bytes to {}", size, self.location(key));
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}
