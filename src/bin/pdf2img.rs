//! CLI binary for edgequake-pdf2img.
//!
//! A thin shim over the library crate: resolves the run configuration from
//! the environment, wires a store and the pdfium engine into a [`Handler`],
//! and feeds it the triggering event(s).

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2img::store::{LocalStore, ObjectStore, S3Store, S3StoreConfig};
use edgequake_pdf2img::{CreationEvent, Handler, PdfiumRasterizer, RunConfig, S3EventNotification};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Handle an S3 event notification delivered as a file
  DESTINATION_BUCKET=page-images pdf2img event.json

  # Same, reading the notification from stdin
  cat event.json | DESTINATION_BUCKET=page-images pdf2img -

  # Convert one object directly
  DESTINATION_BUCKET=page-images pdf2img --bucket incoming-docs --key report.pdf

  # Run against a local directory tree instead of S3 (<root>/<bucket>/<key>)
  DESTINATION_BUCKET=out pdf2img --local-root ./data --bucket in --key report.pdf

OUTPUT LAYOUT:
  <stem>-num_pages-<N>/<stem>-page<i>.<fmt>
  Each page carries ORIGINAL_DOCUMENT_BUCKET, ORIGINAL_DOCUMENT_KEY,
  PAGE_NUMBER (zero-based) and PAGE_COUNT metadata.

ENVIRONMENT VARIABLES:
  DESTINATION_BUCKET   Bucket receiving the page images (required)
  ORIGIN_BUCKET        Only handle events from this bucket
  DPI                  Rendering resolution (default: 300)
  FMT                  ppm | jpeg | png | tiff (default: png)
  PDFIUM_LIB_PATH      Path to libpdfium; system library otherwise
  S3_ENDPOINT_URL      Custom S3 endpoint (MinIO, LocalStack)
  RUST_LOG             Log filter, overrides --verbose / --quiet
"#;

/// Render every page of a newly uploaded PDF to images in another bucket.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Render every page of a newly uploaded PDF to images in another bucket",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// S3 event notification JSON file, or `-` for stdin.
    #[arg(conflicts_with_all = ["bucket", "key"])]
    event: Option<PathBuf>,

    /// Source bucket of a single object to convert.
    #[arg(long, requires = "key")]
    bucket: Option<String>,

    /// Source key of a single object to convert.
    #[arg(long, requires = "bucket")]
    key: Option<String>,

    /// Use a local directory as the object store instead of S3.
    #[arg(long, env = "PDF2IMG_LOCAL_ROOT")]
    local_root: Option<PathBuf>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Custom S3 endpoint URL.
    #[arg(long, env = "S3_ENDPOINT_URL")]
    s3_endpoint_url: Option<String>,

    /// Use path-style S3 addressing.
    #[arg(long, env = "S3_FORCE_PATH_STYLE")]
    s3_force_path_style: bool,

    /// Emit logs as JSON lines.
    #[arg(long, env = "PDF2IMG_JSON_LOGS")]
    json_logs: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    // ── Configuration: a missing destination stops us before any event ──
    let config = Arc::new(RunConfig::from_env().context("Failed to resolve configuration")?);

    let events = read_events(&cli).await?;
    if events.is_empty() {
        info!("No object-created records in the notification; nothing to do");
    }

    let store: Arc<dyn ObjectStore> = match cli.local_root {
        Some(ref root) => {
            info!(root = %root.display(), "Using local object store");
            Arc::new(LocalStore::new(root))
        }
        None => Arc::new(
            S3Store::new(&S3StoreConfig {
                endpoint_url: cli.s3_endpoint_url.clone(),
                force_path_style: cli.s3_force_path_style,
            })
            .await,
        ),
    };
    let rasterizer = Arc::new(PdfiumRasterizer::new(cli.pdfium_lib.clone()));
    let handler = Handler::new(config, store, rasterizer);

    let responses = match handler.handle_events(&events).await {
        Ok(responses) => responses,
        Err(e) => anyhow::bail!("{}: {}", e.kind(), e),
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&responses).context("Failed to serialise response")?
    );
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Collect the events to handle from `--bucket/--key` or a notification.
async fn read_events(cli: &Cli) -> Result<Vec<CreationEvent>> {
    if let (Some(bucket), Some(key)) = (&cli.bucket, &cli.key) {
        return Ok(vec![CreationEvent::new(bucket.as_str(), key.as_str())]);
    }

    let Some(ref path) = cli.event else {
        anyhow::bail!("Provide an event notification file (or `-`) or --bucket and --key");
    };

    let raw = if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("Failed to read event notification from stdin")?;
        buf
    } else {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read event notification from {:?}", path))?
    };

    let notification =
        S3EventNotification::from_json(&raw).context("Failed to parse event notification")?;
    notification
        .creation_events()
        .context("Failed to decode event notification")
}
