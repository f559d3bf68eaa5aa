//! Kaenguru-Crawler: a comic archive harvester
//!
//! This crate crawls a paginated web comic archive, extracts the metadata of
//! every comic (id, title, publication date, image URL and image dimensions)
//! and produces a JSON collection sorted by comic id.

pub mod comic;
pub mod config;
pub mod crawler;
pub mod gist;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Extraction failed for {url}: {source}")]
    Extract { url: String, source: ExtractError },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Errors raised while fetching a single URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Fetch failed for {url}, status code: {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// Returns the HTTP status if the server answered with an error status
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }
}

/// Errors raised by the record extractor
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("No pagination anchors found on page")]
    NoPagination,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use comic::{ComicRecord, Dimensions, ImageRef};
pub use config::Config;
pub use crawler::{crawl_all, Coordinator};
pub use state::CrawlPhase;
