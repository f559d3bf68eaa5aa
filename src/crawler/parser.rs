//! Record extractor for archive listing pages
//!
//! Listing pages are not parsed into a document tree. Each page holds up to
//! 50 comics, and all of them are matched at once with a single pattern over
//! the raw markup. If the upstream markup drifts, fewer or zero records come
//! out. Nothing fails loudly.
//!
//! This module extracts:
//! - Comic teasers (id, title, thumbnail URL, timestamp) in document order
//! - The page index of the last pagination anchor

use crate::comic::ComicRecord;
use crate::ExtractError;
use lazy_static::lazy_static;
use regex::Regex;

/// Final path segment selecting the original resolution on a white background
pub const ORIGINAL_IMAGE_VARIANT: &str = "original__ffffff";

lazy_static! {
    // id, title, thumbnail URL and timestamp, in this order within one teaser
    static ref TEASER_RE: Regex = Regex::new(
        r#"(?s)<img.*?class="zon-teaser-standard__media-item".*?alt="Folge ([0-9]+): (.*?)".*?src="(.*?)".*?<time.*?datetime="(.*?)""#
    )
    .unwrap();
    static ref PAGER_RE: Regex =
        Regex::new(r#"(?s)<li class="pager__page"><a href="[^"]*?([0-9]+)""#).unwrap();
}

/// Records and pagination information extracted from one listing page
#[derive(Debug, Clone, PartialEq)]
pub struct PageExtraction {
    /// Comics in document order, image dimensions not yet resolved
    pub records: Vec<ComicRecord>,

    /// Label of the last pagination anchor in document order
    pub max_page_index: u32,
}

/// Extracts comics and the page count from a listing page
///
/// # Returns
///
/// * `Ok(PageExtraction)` - Records plus the last pagination label
/// * `Err(ExtractError::NoPagination)` - The page has no pagination anchors
///
/// # Example
///
/// ```
/// use kaenguru_crawler::crawler::extract;
///
/// let html = r#"<ul><li class="pager__page"><a href="?p=1">1</a></li>
/// <li class="pager__page"><a href="?p=2">2</a></li></ul>"#;
/// let page = extract(html).unwrap();
/// assert!(page.records.is_empty());
/// assert_eq!(page.max_page_index, 2);
/// ```
pub fn extract(body: &str) -> Result<PageExtraction, ExtractError> {
    let max_page_index = extract_max_page_index(body).ok_or(ExtractError::NoPagination)?;
    let records = extract_records(body);

    Ok(PageExtraction {
        records,
        max_page_index,
    })
}

/// Extracts all comic teasers in document order
///
/// A teaser whose id does not fit into an integer is still emitted, with id 0.
pub fn extract_records(body: &str) -> Vec<ComicRecord> {
    TEASER_RE
        .captures_iter(body)
        .map(|caps| {
            let raw_id = &caps[1];
            let id = raw_id.parse::<u64>().unwrap_or_else(|e| {
                tracing::warn!("Could not extract ID of comic from '{}': {}", raw_id, e);
                0
            });

            ComicRecord::new(id, &caps[2], &caps[4], rewrite_image_url(&caps[3]))
        })
        .collect()
}

/// Returns the label of the last pagination anchor in document order
///
/// This is the last occurrence, not the largest value. The archive renders
/// its pager in ascending order, so the two coincide on real pages.
pub fn extract_max_page_index(body: &str) -> Option<u32> {
    PAGER_RE
        .captures_iter(body)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .last()
}

/// Replaces the final path segment of a thumbnail URL with the
/// original-resolution variant
///
/// # Example
///
/// ```
/// use kaenguru_crawler::crawler::rewrite_image_url;
///
/// assert_eq!(
///     rewrite_image_url("https://img.zeit.de/comics/2022-05/14/wide__320x180"),
///     "https://img.zeit.de/comics/2022-05/14/original__ffffff"
/// );
/// ```
pub fn rewrite_image_url(thumbnail: &str) -> String {
    match thumbnail.rsplit_once('/') {
        Some((head, _)) => format!("{}/{}", head, ORIGINAL_IMAGE_VARIANT),
        None => ORIGINAL_IMAGE_VARIANT.to_string(),
    }
}
