//! Output naming.
//!
//! Downstream consumers parse these keys, so the scheme is fixed:
//!
//! ```text
//! <stem>-num_pages-<N>/<stem>-page<i>.<ext>
//! ```
//!
//! where `<stem>` is the source key up to its first `.`, `N` the page count
//! and `i` the zero-based page index.

use crate::config::OutputFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputKey {
    /// Grouping prefix shared by every page of one document.
    pub directory: String,
    /// Full object key of one page.
    pub key: String,
}

/// Source key truncated at its first `.`.
///
/// The whole key is used, directories included: `dir/report.pdf` → `dir/report`.
/// A dot inside a directory name truncates there too.
pub fn document_stem(source_key: &str) -> &str {
    source_key
        .split_once('.')
        .map_or(source_key, |(stem, _)| stem)
}

/// Grouping directory for a document of `page_count` pages.
pub fn output_directory(source_key: &str, page_count: usize) -> String {
    format!("{}-num_pages-{}", document_stem(source_key), page_count)
}

/// Derive the destination key of page `page_index` (zero-based).
pub fn derive_output_key(
    source_key: &str,
    page_index: usize,
    page_count: usize,
    format: OutputFormat,
) -> OutputKey {
    let stem = document_stem(source_key);
    let directory = output_directory(source_key, page_count);
    let key = format!(
        "{directory}/{stem}-page{page_index}.{ext}",
        ext = format.extension()
    );
    OutputKey { directory, key }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_page_two_of_five() {
        let k = derive_output_key("report.pdf", 2, 5, OutputFormat::Png);
        assert_eq!(k.directory, "report-num_pages-5");
        assert_eq!(k.key, "report-num_pages-5/report-page2.png");
    }

    #[test]
    fn single_page_document() {
        let k = derive_output_key("memo.pdf", 0, 1, OutputFormat::Jpeg);
        assert_eq!(k.key, "memo-num_pages-1/memo-page0.jpeg");
    }

    #[test]
    fn stem_stops_at_first_dot() {
        assert_eq!(document_stem("report.v2.final.pdf"), "report");
        assert_eq!(document_stem("inbox/2024/scan.pdf"), "inbox/2024/scan");
        assert_eq!(document_stem("v1.2/scan.pdf"), "v1");
        assert_eq!(document_stem("no-extension"), "no-extension");
        assert_eq!(document_stem(".pdf"), "");
    }

    #[test]
    fn nested_keys_keep_their_prefix() {
        let k = derive_output_key("inbox/scan.pdf", 3, 4, OutputFormat::Tiff);
        assert_eq!(k.key, "inbox/scan-num_pages-4/inbox/scan-page3.tiff");
    }

    #[test]
    fn every_page_shares_the_directory() {
        let keys: Vec<_> = (0..3)
            .map(|i| derive_output_key("a.pdf", i, 3, OutputFormat::Ppm))
            .collect();
        assert!(keys.iter().all(|k| k.directory == "a-num_pages-3"));
        assert_eq!(keys[2].key, "a-num_pages-3/a-page2.ppm");
    }

    #[test]
    fn degenerate_key_still_yields_a_key() {
        let k = derive_output_key(".pdf", 0, 1, OutputFormat::Png);
        assert_eq!(k.key, "-num_pages-1/-page0.png");
    }
}
