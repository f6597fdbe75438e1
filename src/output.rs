//! Handler response types.

use serde::{Deserialize, Serialize};

/// One page persisted to the destination bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenPage {
    pub bucket: String,
    pub key: String,
    /// Zero-based.
    pub page_number: usize,
    pub size_bytes: usize,
}

/// Acknowledgement returned once every page of a document has been written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResponse {
    pub message: String,
    pub source_bucket: String,
    pub source_key: String,
    pub page_count: usize,
    pub pages: Vec<WrittenPage>,
}

impl HandlerResponse {
    pub fn new(source_bucket: &str, source_key: &str, pages: Vec<WrittenPage>) -> Self {
        Self {
            message: format!(
                "PDF document ({}) successfully converted to a series of images.",
                source_key
            ),
            source_bucket: source_bucket.to_string(),
            source_key: source_key.to_string(),
            page_count: pages.len(),
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_references_source_key() {
        let r = HandlerResponse::new("docs", "report.pdf", vec![]);
        assert_eq!(
            r.message,
            "PDF document (report.pdf) successfully converted to a series of images."
        );
        assert_eq!(r.page_count, 0);
    }

    #[test]
    fn serialises_to_json() {
        let r = HandlerResponse::new(
            "docs",
            "a.pdf",
            vec![WrittenPage {
                bucket: "pages".into(),
                key: "a-num_pages-1/a-page0.png".into(),
                page_number: 0,
                size_bytes: 42,
            }],
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["page_count"], 1);
        assert_eq!(json["pages"][0]["key"], "a-num_pages-1/a-page0.png");
    }
}
