//! Event validation: only PDF documents enter the pipeline.

use crate::error::HandlerError;
use crate::event::CreationEvent;

/// Extension every accepted source key must end with. Case-sensitive.
pub const SUPPORTED_DOCUMENT_EXTENSION: &str = ".pdf";

/// Reject events whose key does not name a PDF document.
///
/// Runs before any I/O, so a rejected event never touches the store.
pub fn validate_event(event: &CreationEvent) -> Result<(), HandlerError> {
    if event.key.ends_with(SUPPORTED_DOCUMENT_EXTENSION) {
        Ok(())
    } else {
        Err(HandlerError::UnsupportedInputKind {
            key: event.key.clone(),
            expected: SUPPORTED_DOCUMENT_EXTENSION,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_keys() {
        for key in ["a.pdf", "dir/sub/report.v2.pdf", ".pdf"] {
            assert!(validate_event(&CreationEvent::new("in", key)).is_ok(), "{key}");
        }
    }

    #[test]
    fn rejects_other_keys() {
        for key in ["a.png", "a.PDF", "a.pdf.bak", "pdf", "folder/"] {
            let err = validate_event(&CreationEvent::new("in", key)).unwrap_err();
            assert!(
                matches!(err, HandlerError::UnsupportedInputKind { key: ref got, .. } if got == key),
                "{key}"
            );
        }
    }
}
