//! Run configuration for the PDF-to-image handler.
//!
//! Every knob lives in one immutable [`RunConfig`], resolved once at process
//! start and shared by reference with the handler. No pipeline stage reads
//! the environment itself.
//!
//! Resolution is deliberately asymmetric:
//!
//! | Variable             | Absent            | Invalid            |
//! |----------------------|-------------------|--------------------|
//! | `DPI`                | 300 (info)        | 300 (warn)         |
//! | `FMT`                | `png` (info)      | `png` (warn)       |
//! | `DESTINATION_BUCKET` | **fatal**         | **fatal** if empty |
//! | `ORIGIN_BUCKET`      | unscoped (info)   | -                  |

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

pub const DPI_VAR: &str = "DPI";
pub const FORMAT_VAR: &str = "FMT";
pub const DESTINATION_BUCKET_VAR: &str = "DESTINATION_BUCKET";
pub const ORIGIN_BUCKET_VAR: &str = "ORIGIN_BUCKET";

/// Rendering resolution used when no valid `DPI` is configured.
pub const DEFAULT_DPI: u32 = 300;

/// Image encoding for rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Binary portable pixmap (P6).
    Ppm,
    Jpeg,
    /// Lossless; the default.
    #[default]
    Png,
    Tiff,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Ppm,
        OutputFormat::Jpeg,
        OutputFormat::Png,
        OutputFormat::Tiff,
    ];

    /// Lowercase name, also used as the file extension of every page key.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Ppm => "ppm",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// MIME type sent with each stored page.
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Ppm => "image/x-portable-pixmap",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Tiff => "image/tiff",
        }
    }

    fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    /// Exact, case-sensitive match on the lowercase name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == s)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "unsupported image format '{}' (supported: {})",
                    s,
                    Self::supported_list()
                ))
            })
    }
}

/// Immutable configuration for every invocation served by this process.
///
/// Built via [`RunConfig::from_env`] in production, or via
/// [`RunConfig::builder`] from library code and tests.
///
/// # Example
/// ```rust
/// use edgequake_pdf2img::{OutputFormat, RunConfig};
///
/// let config = RunConfig::builder("page-images")
///     .dpi(150)
///     .format(OutputFormat::Jpeg)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// Rendering resolution in dots per inch. Always > 0. Default: 300.
    pub dpi: u32,

    /// Encoding of every written page. Default: PNG.
    pub format: OutputFormat,

    /// Bucket that receives the rendered pages. Required.
    pub destination_bucket: String,

    /// Bucket whose object-created events this handler serves.
    ///
    /// `None` accepts events from any bucket.
    pub origin_bucket: Option<String>,
}

impl RunConfig {
    pub fn builder(destination_bucket: impl Into<String>) -> RunConfigBuilder {
        RunConfigBuilder {
            config: RunConfig {
                dpi: DEFAULT_DPI,
                format: OutputFormat::default(),
                destination_bucket: destination_bucket.into(),
                origin_bucket: None,
            },
        }
    }

    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the configuration through `lookup`, which returns the raw value
    /// of a variable or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dpi = resolve_dpi(lookup(DPI_VAR));
        let format = resolve_format(lookup(FORMAT_VAR));

        let destination_bucket = match lookup(DESTINATION_BUCKET_VAR) {
            Some(bucket) if !bucket.is_empty() => bucket,
            _ => {
                return Err(ConfigError::MissingDestination {
                    var: DESTINATION_BUCKET_VAR,
                })
            }
        };
        info!(
            bucket = %destination_bucket,
            "Setting the destination bucket. Be sure to set the bucket trigger on the handler's configuration"
        );

        let origin_bucket = lookup(ORIGIN_BUCKET_VAR).filter(|b| !b.is_empty());
        match origin_bucket {
            Some(ref bucket) => info!(
                bucket = %bucket,
                "Setting the origin bucket. Be sure to set the bucket trigger on the handler's configuration"
            ),
            None => info!(
                "No {} set; events from any bucket are accepted",
                ORIGIN_BUCKET_VAR
            ),
        }

        Ok(Self {
            dpi,
            format,
            destination_bucket,
            origin_bucket,
        })
    }

    /// Whether events from `bucket` fall inside this handler's trigger scope.
    pub fn accepts_bucket(&self, bucket: &str) -> bool {
        self.origin_bucket
            .as_deref()
            .map_or(true, |origin| origin == bucket)
    }
}

fn resolve_dpi(raw: Option<String>) -> u32 {
    let Some(raw) = raw else {
        info!("No {DPI_VAR} environment variable set. Using the default: {DPI_VAR}={DEFAULT_DPI}");
        return DEFAULT_DPI;
    };
    match raw.trim().parse::<u32>() {
        Ok(dpi) if dpi > 0 => dpi,
        Ok(_) => {
            warn!("{DPI_VAR} must be positive, got 0. Using the default: {DPI_VAR}={DEFAULT_DPI}");
            DEFAULT_DPI
        }
        Err(e) => {
            warn!(
                "Couldn't process {DPI_VAR} environment variable '{raw}': {e}. \
                 Using the default: {DPI_VAR}={DEFAULT_DPI}"
            );
            DEFAULT_DPI
        }
    }
}

fn resolve_format(raw: Option<String>) -> OutputFormat {
    let default = OutputFormat::default();
    let Some(raw) = raw else {
        info!("No {FORMAT_VAR} environment variable set. Using the default: {FORMAT_VAR}='{default}'");
        return default;
    };
    match raw.parse::<OutputFormat>() {
        Ok(format) => format,
        Err(_) => {
            warn!(
                "Couldn't process {FORMAT_VAR} variable '{raw}'. Only the following formats are supported: {}. \
                 Using the default: {FORMAT_VAR}='{default}'",
                OutputFormat::supported_list()
            );
            default
        }
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn origin_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.origin_bucket = Some(bucket.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let c = &self.config;
        if c.dpi == 0 {
            return Err(ConfigError::Invalid("DPI must be positive".into()));
        }
        if c.destination_bucket.is_empty() {
            return Err(ConfigError::Invalid(
                "destination bucket must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
