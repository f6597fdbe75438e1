//! Directory-backed object store for running the handler without S3.
//!
//! Layout: `<root>/<bucket>/<key>`. User metadata and the content type live
//! in a JSON sidecar next to the object, `<key>.metadata.json`. Writes go to a
//! temporary file first and are renamed into place, so a reader never sees a
//! half-written page.

use super::{ObjectMetadata, ObjectStore, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

const SIDECAR_SUFFIX: &str = ".metadata.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidecar {
    pub content_type: String,
    pub metadata: ObjectMetadata,
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the sidecar written alongside `key`, if any.
    pub async fn read_sidecar(&self, bucket: &str, key: &str) -> Result<Sidecar, StoreError> {
        let path = suffixed(&self.object_path(bucket, key)?, SIDECAR_SUFFIX);
        let raw = tokio::fs::read(&path)
            .await
            .map_err(|e| io_to_store(e, bucket, key))?;
        serde_json::from_slice(&raw).map_err(|e| StoreError::Backend {
            message: format!("corrupt sidecar {}: {e}", path.display()),
        })
    }

    /// Map `(bucket, key)` onto the filesystem, refusing anything that would
    /// escape the root.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(bucket).join(key);
        let escapes = bucket.is_empty()
            || key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(StoreError::Backend {
                message: format!("refusing object path outside store root: {bucket}/{key}"),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(bucket, key)?;
        debug!(path = %path.display(), "Reading local object");
        tokio::fs::read(&path)
            .await
            .map_err(|e| io_to_store(e, bucket, key))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_to_store(e, bucket, key))?;
        }

        let sidecar = Sidecar {
            content_type: content_type.to_string(),
            metadata: metadata.clone(),
        };
        let sidecar_json = serde_json::to_vec_pretty(&sidecar).map_err(|e| StoreError::Backend {
            message: format!("failed to serialise metadata: {e}"),
        })?;

        let size = data.len();
        write_atomic(&path, data)
            .await
            .map_err(|e| io_to_store(e, bucket, key))?;
        write_atomic(&suffixed(&path, SIDECAR_SUFFIX), sidecar_json)
            .await
            .map_err(|e| io_to_store(e, bucket, key))?;

        debug!(path = %path.display(), bytes = size, "Wrote local object");
        Ok(())
    }
}

/// Write through a uniquely named temp file in the target directory, then
/// rename it into place. Concurrent writers to one key never share a temp file.
async fn write_atomic(path: &Path, bytes: Vec<u8>) -> io::Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok::<_, io::Error>(())
    })
    .await
    .map_err(io::Error::other)?
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

fn io_to_store(err: io::Error, bucket: &str, key: &str) -> StoreError {
    match err.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        io::ErrorKind::PermissionDenied => StoreError::AccessDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: err.to_string(),
        },
        _ => StoreError::Backend {
            message: format!("{bucket}/{key}: {err}"),
        },
    }
}
