//! # edgequake-pdf2img
//!
//! Event-triggered PDF → page-image conversion for object stores.
//!
//! When a PDF lands in a source bucket, the handler renders every page to an
//! image and writes each page to a destination bucket, tagged with metadata
//! that ties it back to the original document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! object-created event
//!  │
//!  ├─ 1. Validate   key must end with .pdf (no I/O on rejection)
//!  ├─ 2. Fetch      whole source object from the store
//!  ├─ 3. Render     rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 4. Name       <stem>-num_pages-<N>/<stem>-page<i>.<fmt>
//!  ├─ 5. Encode     ppm / jpeg / png / tiff, in memory
//!  └─ 6. Write      one object per page + provenance metadata
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2img::{CreationEvent, Handler, PdfiumRasterizer, RunConfig};
//! use edgequake_pdf2img::store::{S3Store, S3StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // DESTINATION_BUCKET is required; DPI / FMT / ORIGIN_BUCKET are optional.
//!     let config = Arc::new(RunConfig::from_env()?);
//!     let store = Arc::new(S3Store::new(&S3StoreConfig::default()).await);
//!     let handler = Handler::new(config, store, Arc::new(PdfiumRasterizer::default()));
//!
//!     let response = handler
//!         .handle(&CreationEvent::new("incoming-docs", "report.pdf"))
//!         .await?;
//!     println!("{}", response.message);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod output;
pub mod pipeline;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{OutputFormat, RunConfig, RunConfigBuilder};
pub use error::{ConfigError, ErrorKind, HandlerError};
pub use event::{CreationEvent, S3EventNotification};
pub use handler::{Handler, PipelineState};
pub use output::{HandlerResponse, WrittenPage};
pub use pipeline::render::{PdfiumRasterizer, RasterError, RasterFrame, RasterOptions, Rasterizer};
pub use store::{ObjectStore, StoreError};
