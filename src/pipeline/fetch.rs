//! Source download.

use crate::error::HandlerError;
use crate::store::ObjectStore;
use tracing::info;

/// Download the full source document. No retry: the invoker owns redelivery.
pub async fn fetch_document(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<Vec<u8>, HandlerError> {
    info!("Fetching item (bucket: '{}', key: '{}')", bucket, key);

    let bytes = store
        .get_object(bucket, key)
        .await
        .map_err(|e| HandlerError::SourceUnavailable {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason: e.to_string(),
        })?;

    info!(size_bytes = bytes.len(), "Successfully retrieved source object");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn returns_object_bytes() {
        let store = MemoryStore::new();
        store.insert("in", "a.pdf", b"%PDF-1.7".to_vec());
        let bytes = fetch_document(&store, "in", "a.pdf").await.unwrap();
        assert_eq!(bytes, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn missing_object_is_source_unavailable() {
        let store = MemoryStore::new();
        let err = fetch_document(&store, "in", "gone.pdf").await.unwrap_err();
        match err {
            HandlerError::SourceUnavailable { bucket, key, reason } => {
                assert_eq!(bucket, "in");
                assert_eq!(key, "gone.pdf");
                assert!(reason.contains("not found"), "got: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
