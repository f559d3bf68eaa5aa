/// Comic record definitions
///
/// Records are created once per extraction pass and never updated in place.
/// Filling in image dimensions produces a new record.
use serde::{Deserialize, Serialize};

/// A single comic as listed in the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComicRecord {
    /// Source-assigned episode number
    pub id: u64,

    /// Episode title as found in the markup
    pub title: String,

    /// ISO-8601 timestamp with offset, kept verbatim
    #[serde(rename = "date")]
    pub publication_date: String,

    /// Canonical image of the comic
    #[serde(rename = "img")]
    pub image: ImageRef,
}

impl ComicRecord {
    /// Creates a record whose image dimensions are not yet known
    pub fn new(
        id: u64,
        title: impl Into<String>,
        publication_date: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            publication_date: publication_date.into(),
            image: ImageRef::unresolved(source_url),
        }
    }

    /// Returns a copy of this record with the given image dimensions
    pub fn with_dimensions(self, dimensions: Dimensions) -> Self {
        Self {
            image: self.image.with_dimensions(dimensions),
            ..self
        }
    }
}

/// Reference to the full-resolution image of a comic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Rewritten image URL (original resolution, white background)
    #[serde(rename = "src")]
    pub source_url: String,

    pub width: u32,

    pub height: u32,

    /// `width / height`, or 0 when the height is 0
    #[serde(rename = "ratio")]
    pub aspect_ratio: f64,
}

impl ImageRef {
    /// Creates an image reference with zero-valued dimensions
    pub fn unresolved(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            width: 0,
            height: 0,
            aspect_ratio: 0.0,
        }
    }

    /// Returns a copy of this reference carrying the given dimensions
    pub fn with_dimensions(self, dimensions: Dimensions) -> Self {
        Self {
            width: dimensions.width,
            height: dimensions.height,
            aspect_ratio: dimensions.aspect_ratio,
            ..self
        }
    }
}

/// Pixel dimensions of an image
///
/// The default value (all zeros) stands for "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
}

impl Dimensions {
    /// Creates dimensions and derives the aspect ratio
    ///
    /// A height of 0 yields a ratio of 0 instead of dividing by zero.
    pub fn new(width: u32, height: u32) -> Self {
        let aspect_ratio = if height == 0 {
            0.0
        } else {
            f64::from(width) / f64::from(height)
        };

        Self {
            width,
            height,
            aspect_ratio,
        }
    }

    /// Returns true if no dimensions could be determined
    pub fn is_unknown(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

/// Sorts records ascending by id
///
/// The sort is stable: records sharing an id keep their relative order.
pub fn sort_by_id(records: &mut [ComicRecord]) {
    records.sort_by_key(|record| record.id);
}
