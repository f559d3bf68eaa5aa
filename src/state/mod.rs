//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the phase a crawl run is in (bootstrapping, fanning out,
//!   collecting, sorting, done)

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
