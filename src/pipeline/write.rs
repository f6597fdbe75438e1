//! Page persistence with provenance metadata.

use crate::config::OutputFormat;
use crate::error::HandlerError;
use crate::output::WrittenPage;
use crate::pipeline::encode::encode_frame;
use crate::pipeline::keys::OutputKey;
use crate::pipeline::render::RasterFrame;
use crate::store::{ObjectMetadata, ObjectStore};
use tracing::info;

pub const ORIGINAL_DOCUMENT_BUCKET: &str = "ORIGINAL_DOCUMENT_BUCKET";
pub const ORIGINAL_DOCUMENT_KEY: &str = "ORIGINAL_DOCUMENT_KEY";
pub const PAGE_NUMBER: &str = "PAGE_NUMBER";
pub const PAGE_COUNT: &str = "PAGE_COUNT";

/// Links one output page back to its source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceMetadata {
    pub original_bucket: String,
    pub original_key: String,
    /// Zero-based.
    pub page_number: usize,
    pub page_count: usize,
}

impl ProvenanceMetadata {
    /// String-valued map attached to the stored object.
    pub fn to_map(&self) -> ObjectMetadata {
        ObjectMetadata::from([
            (ORIGINAL_DOCUMENT_BUCKET.to_string(), self.original_bucket.clone()),
            (ORIGINAL_DOCUMENT_KEY.to_string(), self.original_key.clone()),
            (PAGE_NUMBER.to_string(), self.page_number.to_string()),
            (PAGE_COUNT.to_string(), self.page_count.to_string()),
        ])
    }
}

/// Encode `frame` and store it at `output_key` in `bucket`.
///
/// The page is identified by `provenance.page_number`, not by the frame's own
/// index.
///
/// Creates or overwrites exactly one object. Earlier pages are left alone
/// when this one fails.
pub async fn write_page(
    store: &dyn ObjectStore,
    bucket: &str,
    output_key: &OutputKey,
    frame: &RasterFrame,
    format: OutputFormat,
    provenance: &ProvenanceMetadata,
) -> Result<WrittenPage, HandlerError> {
    let failure = |reason: String| HandlerError::WriteFailure {
        bucket: bucket.to_string(),
        key: output_key.key.clone(),
        page: provenance.page_number,
        reason,
    };

    let bytes = encode_frame(&frame.image, format)
        .map_err(|e| failure(format!("Image encoding failed: {}", e)))?;
    let size_bytes = bytes.len();

    info!(
        "Saving page number {} to location: {}, {}",
        provenance.page_number, bucket, output_key.key
    );

    store
        .put_object(
            bucket,
            &output_key.key,
            bytes,
            format.content_type(),
            &provenance.to_map(),
        )
        .await
        .map_err(|e| failure(e.to_string()))?;

    Ok(WrittenPage {
        bucket: bucket.to_string(),
        key: output_key.key.clone(),
        page_number: provenance.page_number,
        size_bytes,
    })
}
