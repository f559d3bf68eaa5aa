//! Crawler module for fetching and extracting archive pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP transport abstraction and the page fetcher
//! - Pattern-based record extraction
//! - Image dimension probing
//! - Overall crawl coordination

mod coordinator;
mod dimensions;
mod fetcher;
mod parser;
mod pipeline;
mod transport;

pub use coordinator::{run_crawl, Coordinator};
pub use dimensions::{
    parse_dimensions, DimensionError, DimensionInspector, DimensionResolver,
    FileCommandInspector, PROBE_BYTES,
};
pub use fetcher::PageFetcher;
pub use parser::{
    extract, extract_max_page_index, extract_records, rewrite_image_url, PageExtraction,
    ORIGINAL_IMAGE_VARIANT,
};
pub use pipeline::PagePipeline;
pub use transport::{build_http_client, RawResponse, ReqwestTransport, Transport};

use crate::comic::ComicRecord;
use crate::config::CrawlerConfig;
use crate::CrawlError;

/// Crawls the whole archive and returns all comics sorted by id
///
/// This is the main entry point for a crawl. It will:
/// 1. Fetch page 1 and read the page count from its pager
/// 2. Fetch all remaining pages concurrently
/// 3. Probe every comic's image for its dimensions
/// 4. Collect page results, skipping pages that fail or time out
/// 5. Sort the merged result by comic id
///
/// # Returns
///
/// * `Ok(Vec<ComicRecord>)` - Crawl completed, possibly with skipped pages
/// * `Err(CrawlError)` - The first page could not be fetched or parsed
pub async fn crawl_all(config: &CrawlerConfig) -> Result<Vec<ComicRecord>, CrawlError> {
    run_crawl(config).await
}
