//! In-process object store.

use super::{ObjectMetadata, ObjectStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// One stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
    pub metadata: ObjectMetadata,
}

/// Objects kept in a map keyed by `(bucket, key)`, ordered for stable listing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, as an upload by another party would.
    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) {
        self.lock().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: data.into(),
                content_type: "application/octet-stream".to_string(),
                metadata: ObjectMetadata::new(),
            },
        );
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock only means another test thread panicked mid-insert;
    // the map itself is still usable.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<(String, String), StoredObject>> {
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.get(bucket, key)
            .map(|o| o.data)
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        self.lock().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data,
                content_type: content_type.to_string(),
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get() {
        let store = MemoryStore::new();
        let mut meta = ObjectMetadata::new();
        meta.insert("PAGE_NUMBER".into(), "0".into());

        store
            .put_object("out", "a/b.png", vec![1, 2, 3], "image/png", &meta)
            .await
            .unwrap();

        assert_eq!(store.get_object("out", "a/b.png").await.unwrap(), vec![1, 2, 3]);
        let stored = store.get("out", "a/b.png").unwrap();
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.metadata, meta);
        assert_eq!(store.keys("out"), vec!["a/b.png".to_string()]);
        assert!(store.keys("in").is_empty());
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get_object("in", "nope.pdf").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn insert_is_visible_synchronously() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.insert("in", "doc.pdf", b"%PDF".to_vec());
        assert_eq!(store.len(), 1);
        let data = tokio_test::block_on(store.get_object("in", "doc.pdf")).unwrap();
        assert_eq!(data, b"%PDF");
    }
}
