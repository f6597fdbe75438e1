//! Object-store boundary.
//!
//! The pipeline only needs two operations: read a whole object and write a
//! whole object with user metadata. [`ObjectStore`] captures exactly that so
//! the handler can run against S3 in production, a directory tree locally,
//! or an in-memory map in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

pub mod local;
pub mod memory;
pub mod s3;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use s3::{S3Store, S3StoreConfig};

/// User metadata attached to a stored object.
pub type ObjectMetadata = HashMap<String, String>;

/// Errors returned by an [`ObjectStore`] backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Access denied to s3://{bucket}/{key}: {message}")]
    AccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    /// Transport, service, or local I/O failure.
    #[error("{message}")]
    Backend { message: String },
}

/// Whole-object read/write operations used by the pipeline.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download the full content of an object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Create or overwrite an object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError>;
}
