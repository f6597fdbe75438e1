//! Trigger decoding: S3 event notifications → [`CreationEvent`]s.
//!
//! Only the fields the handler needs are modelled; everything else in the
//! notification document is ignored. Object keys in notifications are
//! form-encoded (`+` for a space, `%XX` escapes) and must be decoded before
//! they can be fetched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The object whose creation triggered a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreationEvent {
    pub bucket: String,
    pub key: String,
}

impl CreationEvent {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Malformed event notification: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Object key '{raw}' is not valid form-encoded UTF-8: {reason}")]
    InvalidKey { raw: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3EventNotification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3EventRecord {
    #[serde(rename = "eventName", default)]
    pub event_name: String,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// Form-encoded key, exactly as delivered.
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl S3EventNotification {
    pub fn from_json(bytes: &[u8]) -> Result<Self, EventError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decoded creation events, in record order. Non-creation records
    /// (deletes, restores, …) are dropped.
    pub fn creation_events(&self) -> Result<Vec<CreationEvent>, EventError> {
        self.records
            .iter()
            .filter(|r| r.is_object_created())
            .map(S3EventRecord::creation_event)
            .collect()
    }
}

impl S3EventRecord {
    pub fn is_object_created(&self) -> bool {
        self.event_name.starts_with("ObjectCreated:")
    }

    pub fn creation_event(&self) -> Result<CreationEvent, EventError> {
        Ok(CreationEvent {
            bucket: self.s3.bucket.name.clone(),
            key: decode_object_key(&self.s3.object.key)?,
        })
    }
}

/// Undo the form encoding S3 applies to keys in notifications.
pub fn decode_object_key(raw: &str) -> Result<String, EventError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|k| k.into_owned())
        .map_err(|e| EventError::InvalidKey {
            raw: raw.to_string(),
            reason: e.to_string(),
        })
}
