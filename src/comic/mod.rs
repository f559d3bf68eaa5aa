//! Comic data model
//!
//! This module defines the records produced by a crawl:
//!
//! - `ComicRecord`: one comic with its id, title, date and image
//! - `ImageRef`: the canonical image URL with its pixel dimensions
//! - `Dimensions`: width, height and aspect ratio of an image

mod record;

pub use record::{sort_by_id, ComicRecord, Dimensions, ImageRef};
