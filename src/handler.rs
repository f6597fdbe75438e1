//! Pipeline orchestration for one triggering event.
//!
//! ```text
//! Validating ─▶ Fetching ─▶ Rasterizing ─▶ Writing(0) ─▶ … ─▶ Writing(N-1) ─▶ Done
//!      │            │             │              │                  │
//!      └────────────┴─────────────┴──────────────┴──────────────────┴─▶ Failed(kind)
//! ```
//!
//! Each state calls exactly one collaborator. The first failure ends the
//! invocation: pages already written stay written, nothing is retried.
//! Because output keys are deterministic, a redelivered event simply
//! overwrites the same objects.

use crate::config::RunConfig;
use crate::error::{ErrorKind, HandlerError};
use crate::event::CreationEvent;
use crate::output::HandlerResponse;
use crate::pipeline::fetch::fetch_document;
use crate::pipeline::keys::derive_output_key;
use crate::pipeline::render::{render_document, RasterOptions, Rasterizer};
use crate::pipeline::validate::validate_event;
use crate::pipeline::write::{write_page, ProvenanceMetadata};
use crate::store::ObjectStore;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Validating,
    Fetching,
    Rasterizing,
    /// Writing the page with this zero-based index.
    Writing(usize),
    Done,
    Failed(ErrorKind),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Validating => f.write_str("validating"),
            PipelineState::Fetching => f.write_str("fetching"),
            PipelineState::Rasterizing => f.write_str("rasterizing"),
            PipelineState::Writing(page) => write!(f, "writing({page})"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::Failed(kind) => write!(f, "failed({kind})"),
        }
    }
}

/// Converts triggering documents into page images.
///
/// Cheap to clone; every collaborator is shared. Concurrent calls to
/// [`Handler::handle`] are independent of each other.
#[derive(Clone)]
pub struct Handler {
    config: Arc<RunConfig>,
    store: Arc<dyn ObjectStore>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("config", &self.config)
            .field("store", &"<dyn ObjectStore>")
            .field("rasterizer", &"<dyn Rasterizer>")
            .finish()
    }
}

impl Handler {
    pub fn new(
        config: Arc<RunConfig>,
        store: Arc<dyn ObjectStore>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            config,
            store,
            rasterizer,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the full pipeline for one event.
    ///
    /// # Errors
    /// The first failing stage's [`HandlerError`]. Pages written before a
    /// [`HandlerError::WriteFailure`] are not rolled back.
    pub async fn handle(&self, event: &CreationEvent) -> Result<HandlerResponse, HandlerError> {
        let start = Instant::now();
        let result = self.run(event).await;

        match result {
            Ok(ref response) => info!(
                state = %PipelineState::Done,
                bucket = %event.bucket,
                key = %event.key,
                pages = response.page_count,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "{}",
                response.message
            ),
            Err(ref e) => error!(
                state = %PipelineState::Failed(e.kind()),
                bucket = %event.bucket,
                key = %event.key,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "{}",
                e
            ),
        }
        result
    }

    /// Handle events in order, skipping those outside the configured origin
    /// bucket. Stops at the first failure.
    pub async fn handle_events(
        &self,
        events: &[CreationEvent],
    ) -> Result<Vec<HandlerResponse>, HandlerError> {
        let mut responses = Vec::with_capacity(events.len());
        for event in events {
            if !self.config.accepts_bucket(&event.bucket) {
                info!(
                    bucket = %event.bucket,
                    key = %event.key,
                    "Skipping event outside the configured origin bucket"
                );
                continue;
            }
            responses.push(self.handle(event).await?);
        }
        Ok(responses)
    }

    async fn run(&self, event: &CreationEvent) -> Result<HandlerResponse, HandlerError> {
        enter(PipelineState::Validating, event);
        validate_event(event)?;

        enter(PipelineState::Fetching, event);
        let document = fetch_document(self.store.as_ref(), &event.bucket, &event.key).await?;

        enter(PipelineState::Rasterizing, event);
        let options = RasterOptions {
            dpi: self.config.dpi,
            format: self.config.format,
        };
        let frames =
            render_document(Arc::clone(&self.rasterizer), &event.key, document, options).await?;
        let page_count = frames.len();
        info!("Successfully converted pdf to {} images", page_count);

        let mut pages = Vec::with_capacity(page_count);
        // Pages are numbered by position in the frame set.
        for (page_index, frame) in frames.into_iter().enumerate() {
            enter(PipelineState::Writing(page_index), event);
            let output_key =
                derive_output_key(&event.key, page_index, page_count, self.config.format);
            let provenance = ProvenanceMetadata {
                original_bucket: event.bucket.clone(),
                original_key: event.key.clone(),
                page_number: page_index,
                page_count,
            };
            let written = write_page(
                self.store.as_ref(),
                &self.config.destination_bucket,
                &output_key,
                &frame,
                self.config.format,
                &provenance,
            )
            .await?;
            pages.push(written);
        }

        Ok(HandlerResponse::new(&event.bucket, &event.key, pages))
    }
}

fn enter(state: PipelineState, event: &CreationEvent) {
    debug!(state = %state, key = %event.key, "Pipeline transition");
}
