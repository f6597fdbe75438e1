//! End-to-end tests with the real pdfium engine.
//!
//! These render an in-test PDF through [`PdfiumRasterizer`] and a directory
//! backed store. They need a pdfium library (system-wide or via
//! `PDFIUM_LIB_PATH`) and are gated behind the `E2E_ENABLED` environment
//! variable so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=./libpdfium.so cargo test --test e2e -- --nocapture

use edgequake_pdf2img::store::{LocalStore, ObjectMetadata, ObjectStore};
use edgequake_pdf2img::{
    CreationEvent, Handler, OutputFormat, PdfiumRasterizer, RasterOptions, Rasterizer, RunConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

fn rasterizer() -> PdfiumRasterizer {
    PdfiumRasterizer::new(std::env::var("PDFIUM_LIB_PATH").ok().map(PathBuf::from))
}

/// A minimal PDF with `pages` US-Letter pages (612 × 792 pt), each carrying
/// one line of text. Cross-reference offsets are computed, not guessed.
fn sample_pdf(pages: usize) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    let font_id = 3 + pages * 2;
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", 3 + i * 2)).collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages
    ));
    for i in 0..pages {
        let content_id = 4 + i * 2;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {content_id} 0 R >>"
        ));
        let stream = format!("BT /F1 24 Tf 72 700 Td (Page {}) Tj ET", i + 1);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        pdf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    pdf
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn sample_pdf_is_well_formed() {
    let pdf = sample_pdf(2);
    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert!(pdf.ends_with(b"%%EOF\n"));
}

#[test]
fn pdfium_renders_at_requested_dpi() {
    e2e_skip_unless_ready!();

    let frames = rasterizer()
        .rasterize(
            &sample_pdf(3),
            &RasterOptions {
                dpi: 144,
                format: OutputFormat::Png,
            },
        )
        .expect("pdfium should render the sample");

    assert_eq!(frames.len(), 3);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.page_index, i);
        // 612 × 792 pt at 2× scale
        let (w, h) = (frame.image.width(), frame.image.height());
        assert!((1222..=1226).contains(&w), "width {w}");
        assert!((1582..=1586).contains(&h), "height {h}");
    }
}

#[test]
fn pdfium_page_count_is_stable() {
    e2e_skip_unless_ready!();

    let pdf = sample_pdf(4);
    let options = RasterOptions {
        dpi: 72,
        format: OutputFormat::Png,
    };
    let first = rasterizer().rasterize(&pdf, &options).unwrap();
    let second = rasterizer().rasterize(&pdf, &options).unwrap();
    assert_eq!(first.len(), second.len());
}

#[test]
fn pdfium_rejects_corrupt_document() {
    e2e_skip_unless_ready!();

    let err = rasterizer()
        .rasterize(
            b"%PDF-1.4\nthis is not really a pdf",
            &RasterOptions {
                dpi: 72,
                format: OutputFormat::Png,
            },
        )
        .unwrap_err();
    println!("corrupt document rejected: {err}");
}

#[tokio::test(flavor = "multi_thread")]
async fn converts_through_local_store() {
    e2e_skip_unless_ready!();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalStore::new(dir.path()));
    store
        .put_object(
            "docs",
            "letters/hello.pdf",
            sample_pdf(2),
            "application/pdf",
            &ObjectMetadata::new(),
        )
        .await
        .unwrap();

    let config = Arc::new(
        RunConfig::builder("pages")
            .dpi(72)
            .format(OutputFormat::Jpeg)
            .build()
            .unwrap(),
    );
    let handler = Handler::new(config, store.clone(), Arc::new(rasterizer()));

    let response = handler
        .handle(&CreationEvent::new("docs", "letters/hello.pdf"))
        .await
        .expect("conversion should succeed");
    assert_eq!(response.page_count, 2);

    for i in 0..2 {
        let key = format!("letters/hello-num_pages-2/letters/hello-page{i}.jpeg");
        let bytes = store.get_object("pages", &key).await.unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (612, 792));

        let sidecar = store.read_sidecar("pages", &key).await.unwrap();
        assert_eq!(sidecar.content_type, "image/jpeg");
        assert_eq!(sidecar.metadata["PAGE_NUMBER"], i.to_string());
        assert_eq!(sidecar.metadata["PAGE_COUNT"], "2");
        assert_eq!(sidecar.metadata["ORIGINAL_DOCUMENT_KEY"], "letters/hello.pdf");
    }
    println!("✓ {}", response.message);
}
