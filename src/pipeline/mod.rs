//! Pipeline stages for PDF-to-image conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the orchestrator in [`crate::handler`] stays a plain sequence.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ fetch ──▶ render ──▶ keys ──▶ encode ──▶ write
//! (.pdf?)     (store)   (pdfium)   (names)  (png/…)    (store + metadata)
//! ```
//!
//! 1. [`validate`]: reject keys without the document extension, before I/O
//! 2. [`fetch`]: download the whole source object
//! 3. [`render`]: rasterise every page; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 4. [`keys`]: pure, deterministic output naming
//! 5. [`encode`]: in-memory image encoding in the configured format
//! 6. [`write`]: persist one page with its provenance metadata

pub mod encode;
pub mod fetch;
pub mod keys;
pub mod render;
pub mod validate;
pub mod write;
