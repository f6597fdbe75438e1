//! PDF rasterisation: document bytes → one `DynamicImage` per page.
//!
//! The engine sits behind the [`Rasterizer`] trait so the handler can be
//! driven by a fake in tests. [`PdfiumRasterizer`] is the production engine.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! [`render_document`] moves the work onto tokio's blocking pool so the
//! runtime's worker threads keep serving I/O while a page renders.

use crate::config::OutputFormat;
use crate::error::HandlerError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Points per inch in PDF user space.
const PDF_POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    pub dpi: u32,
    /// Target encoding. Engines that encode themselves may use it; pdfium
    /// renders raw bitmaps and leaves encoding to the writer.
    pub format: OutputFormat,
}

/// One rendered page.
#[derive(Debug, Clone)]
pub struct RasterFrame {
    /// Zero-based position in the document.
    pub page_index: usize,
    pub image: DynamicImage,
}

/// Engine-level failure, converted to
/// [`HandlerError::RasterizationFailure`] by [`render_document`].
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Failed to bind to pdfium library: {0}")]
    Binding(String),

    #[error("Input is not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    #[error("Document could not be loaded: {0}")]
    Load(String),

    #[error("Page {page} could not be rendered: {detail}")]
    Page { page: usize, detail: String },
}

/// Black-box rasterisation capability.
///
/// Implementations must return frames in page order and must yield the same
/// page count for the same input. The handler numbers pages by position in
/// the returned set; `page_index` is only a label for diagnostics.
pub trait Rasterizer: Send + Sync {
    fn rasterize(
        &self,
        document: &[u8],
        options: &RasterOptions,
    ) -> Result<Vec<RasterFrame>, RasterError>;
}

/// pdfium-backed rasteriser.
///
/// Binds to the library at `library_path` when given, otherwise to the
/// platform's system library. A fresh binding is made per document.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    fn bind(&self) -> Result<Pdfium, RasterError> {
        let bindings = match self.library_path {
            Some(ref path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| RasterError::Binding(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(
        &self,
        document: &[u8],
        options: &RasterOptions,
    ) -> Result<Vec<RasterFrame>, RasterError> {
        if !document.starts_with(b"%PDF") {
            return Err(RasterError::NotAPdf {
                magic: document.iter().take(4).copied().collect(),
            });
        }

        let pdfium = self.bind()?;
        let doc = pdfium
            .load_pdf_from_byte_slice(document, None)
            .map_err(|e| RasterError::Load(format!("{:?}", e)))?;

        let pages = doc.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(options.dpi as f32 / PDF_POINTS_PER_INCH);

        let mut frames = Vec::with_capacity(total_pages);
        for (page_index, page) in pages.iter().enumerate() {
            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| RasterError::Page {
                    page: page_index,
                    detail: format!("{:?}", e),
                })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                page_index,
                image.width(),
                image.height()
            );
            frames.push(RasterFrame { page_index, image });
        }

        Ok(frames)
    }
}

/// Rasterise a whole document on the blocking pool.
///
/// Consumes the document bytes; they are dropped once the engine returns.
/// An empty frame set is a failure: a well-formed PDF has at least one page.
pub async fn render_document(
    rasterizer: Arc<dyn Rasterizer>,
    source_key: &str,
    document: Vec<u8>,
    options: RasterOptions,
) -> Result<Vec<RasterFrame>, HandlerError> {
    let failure = |detail: String| HandlerError::RasterizationFailure {
        key: source_key.to_string(),
        detail,
    };

    let frames = tokio::task::spawn_blocking(move || rasterizer.rasterize(&document, &options))
        .await
        .map_err(|e| failure(format!("Render task panicked: {}", e)))?
        .map_err(|e| failure(e.to_string()))?;

    if frames.is_empty() {
        return Err(failure("document has no pages".into()));
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    struct FixedPages(usize);

    impl Rasterizer for FixedPages {
        fn rasterize(
            &self,
            _document: &[u8],
            _options: &RasterOptions,
        ) -> Result<Vec<RasterFrame>, RasterError> {
            Ok((0..self.0)
                .map(|page_index| RasterFrame {
                    page_index,
                    image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                        2,
                        2,
                        Rgba([0, 0, 0, 255]),
                    )),
                })
                .collect())
        }
    }

    struct Panics;

    impl Rasterizer for Panics {
        fn rasterize(&self, _: &[u8], _: &RasterOptions) -> Result<Vec<RasterFrame>, RasterError> {
            panic!("engine crashed")
        }
    }

    fn options() -> RasterOptions {
        RasterOptions {
            dpi: 72,
            format: OutputFormat::Png,
        }
    }

    #[tokio::test]
    async fn frames_come_back_in_order() {
        let frames = render_document(Arc::new(FixedPages(3)), "a.pdf", vec![], options())
            .await
            .unwrap();
        let indices: Vec<_> = frames.iter().map(|f| f.page_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn zero_pages_is_a_failure() {
        let err = render_document(Arc::new(FixedPages(0)), "a.pdf", vec![], options())
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::RasterizationFailure { .. }));
    }

    #[tokio::test]
    async fn engine_panic_is_contained() {
        let err = render_document(Arc::new(Panics), "a.pdf", vec![], options())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("panicked"), "got: {err}");
    }

    #[test]
    fn pdfium_rejects_non_pdf_before_binding() {
        // No library path and possibly no system pdfium: the magic check must
        // fire first.
        let err = PdfiumRasterizer::default()
            .rasterize(b"GIF89a...", &options())
            .unwrap_err();
        match err {
            RasterError::NotAPdf { magic } => assert_eq!(magic, b"GIF8"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
