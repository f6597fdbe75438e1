//! Error types for the edgequake-pdf2img library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConfigError`]: **Fatal at start-up**: the process cannot serve any
//!   event at all (no destination bucket). Returned from
//!   [`crate::config::RunConfig::from_env`] before the first event is read.
//!
//! * [`HandlerError`]: **Fatal for one invocation**: a single event could
//!   not be converted. The process stays up; the invoking mechanism decides
//!   whether to redeliver.
//!
//! Boundary errors ([`crate::store::StoreError`],
//! [`crate::pipeline::render::RasterError`]) are converted into a
//! `HandlerError` by the pipeline stage that called the boundary.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Configuration problems that prevent the handler from starting.
///
/// Non-critical settings (`DPI`, `FMT`) never produce this error; they fall
/// back to their defaults with a diagnostic instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The required destination bucket variable is absent or empty.
    #[error(
        "Couldn't process the {var} environment variable.\n\
The {var} needs to be set to a valid bucket to which the handler has full access."
    )]
    MissingDestination { var: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A failure that aborts one invocation of the handler.
///
/// Pages written before the failure stay written: there is no rollback.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The triggering object does not carry the document extension.
    #[error("Only {expected} files are supported by this handler (got key '{key}')")]
    UnsupportedInputKind { key: String, expected: &'static str },

    /// The source object could not be read.
    #[error("Failed to fetch s3://{bucket}/{key}: {reason}")]
    SourceUnavailable {
        bucket: String,
        key: String,
        reason: String,
    },

    /// The rasterization engine could not decode or render the document.
    #[error("Rasterisation failed for '{key}': {detail}")]
    RasterizationFailure { key: String, detail: String },

    /// Encoding or persisting one page failed.
    #[error("Failed to write page {page} to s3://{bucket}/{key}: {reason}")]
    WriteFailure {
        bucket: String,
        key: String,
        page: usize,
        reason: String,
    },
}

/// Condition name reported to the invoking mechanism alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UnsupportedInputKind,
    SourceUnavailable,
    RasterizationFailure,
    WriteFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnsupportedInputKind => "UnsupportedInputKind",
            ErrorKind::SourceUnavailable => "SourceUnavailable",
            ErrorKind::RasterizationFailure => "RasterizationFailure",
            ErrorKind::WriteFailure => "WriteFailure",
        };
        f.write_str(name)
    }
}

impl HandlerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HandlerError::UnsupportedInputKind { .. } => ErrorKind::UnsupportedInputKind,
            HandlerError::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            HandlerError::RasterizationFailure { .. } => ErrorKind::RasterizationFailure,
            HandlerError::WriteFailure { .. } => ErrorKind::WriteFailure,
        }
    }
}
