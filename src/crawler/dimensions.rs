//! Dimension resolver
//!
//! Image dimensions are recovered without downloading the full asset:
//! - A ranged GET asks for the first 64 bytes of the image only
//! - Those bytes are handed to a `DimensionInspector`
//! - The first `WIDTHxHEIGHT` in the inspector's output wins
//!
//! The default inspector runs the external `file` utility on a temporary
//! copy of the sample.

use crate::comic::Dimensions;
use crate::crawler::transport::Transport;
use crate::FetchError;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RANGE};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Command;

/// Number of leading image bytes needed to read the container header
pub const PROBE_BYTES: usize = 64;

lazy_static! {
    static ref DIMENSIONS_RE: Regex = Regex::new(r"([0-9]+)x([0-9]+)").unwrap();
}

/// Errors raised while probing image dimensions
#[derive(Debug, Error)]
pub enum DimensionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Inspector failed: {0}")]
    Inspector(String),

    #[error("Invalid dimension value '{0}'")]
    InvalidNumber(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that describes an image sample in text
#[async_trait]
pub trait DimensionInspector: Send + Sync {
    /// Returns a textual description of the sample, expected to contain
    /// `WIDTHxHEIGHT` when the format is recognized
    async fn inspect(&self, sample: &[u8]) -> Result<String, DimensionError>;
}

/// Inspector running the external `file` utility
///
/// The utility runs in brief mode (`-b`) so only the format description is
/// returned. A scratch file name that happens to contain `NxM` must never be
/// read as the image size.
#[derive(Debug, Clone)]
pub struct FileCommandInspector {
    program: String,
    scratch_dir: Option<PathBuf>,
}

impl FileCommandInspector {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            scratch_dir: None,
        }
    }

    /// Places scratch copies of the samples in `dir` instead of the system
    /// temp directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }
}

impl Default for FileCommandInspector {
    fn default() -> Self {
        Self::new("file")
    }
}

#[async_trait]
impl DimensionInspector for FileCommandInspector {
    async fn inspect(&self, sample: &[u8]) -> Result<String, DimensionError> {
        // Removed when dropped at the end of this call
        let mut builder = tempfile::Builder::new();
        builder.prefix("probe-").suffix(".webp");
        let mut scratch = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        scratch.write_all(sample)?;
        scratch.flush()?;

        let output = Command::new(&self.program)
            .arg("-b")
            .arg(scratch.path())
            .output()
            .await
            .map_err(|e| {
                DimensionError::Inspector(format!("could not run '{}': {}", self.program, e))
            })?;

        if !output.status.success() {
            return Err(DimensionError::Inspector(format!(
                "'{}' exited with {} for {}",
                self.program,
                output.status,
                scratch.path().display()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(strip_path_prefix(&stdout, scratch.path()).to_string())
    }
}

/// Drops a leading `<path>:` from inspector output
///
/// Implementations of `file` without brief mode still name the file first.
fn strip_path_prefix<'a>(output: &'a str, path: &Path) -> &'a str {
    let path = path.to_string_lossy();
    output
        .strip_prefix(path.as_ref())
        .and_then(|rest| rest.strip_prefix(':'))
        .map(str::trim_start)
        .unwrap_or(output)
}

/// Resolves image dimensions through a partial fetch
#[derive(Clone)]
pub struct DimensionResolver {
    transport: Arc<dyn Transport>,
    inspector: Arc<dyn DimensionInspector>,
}

impl DimensionResolver {
    pub fn new(transport: Arc<dyn Transport>, inspector: Arc<dyn DimensionInspector>) -> Self {
        Self {
            transport,
            inspector,
        }
    }

    /// Fetches the image header and derives its dimensions
    ///
    /// # Returns
    ///
    /// * `Ok(Dimensions)` - Parsed dimensions, or all zeros if the inspector
    ///   output names no `WIDTHxHEIGHT`
    /// * `Err(DimensionError)` - The probe request or the inspector failed
    pub async fn resolve(&self, image_url: &str) -> Result<Dimensions, DimensionError> {
        tracing::debug!("Fetch image dimensions for {}", image_url);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("image/webp"));
        headers.insert(
            RANGE,
            HeaderValue::from_str(&format!("bytes=0-{}", PROBE_BYTES))
                .map_err(|e| DimensionError::Inspector(e.to_string()))?,
        );

        let response = self
            .transport
            .get(image_url, headers, Some(PROBE_BYTES))
            .await?
            .error_for_status(image_url)?;

        let sample = &response.body[..response.body.len().min(PROBE_BYTES)];
        let description = self.inspector.inspect(sample).await?;

        parse_dimensions(&description)
    }
}

/// Extracts the first `WIDTHxHEIGHT` pair from an inspector description
///
/// # Example
///
/// ```
/// use kaenguru_crawler::crawler::parse_dimensions;
///
/// let dims = parse_dimensions("RIFF (little-endian) data, Web/P image, 5613x2000").unwrap();
/// assert_eq!((dims.width, dims.height), (5613, 2000));
/// ```
pub fn parse_dimensions(description: &str) -> Result<Dimensions, DimensionError> {
    let Some(caps) = DIMENSIONS_RE.captures(description) else {
        return Ok(Dimensions::default());
    };

    let width = caps[1]
        .parse::<u32>()
        .map_err(|_| DimensionError::InvalidNumber(caps[1].to_string()))?;
    let height = caps[2]
        .parse::<u32>()
        .map_err(|_| DimensionError::InvalidNumber(caps[2].to_string()))?;

    Ok(Dimensions::new(width, height))
}
