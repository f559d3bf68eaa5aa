//! Configuration module
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Command-line flags are applied on top of it by the
//! binary, after which the result is validated again.
//!
//! # Example
//!
//! ```no_run
//! use kaenguru_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawling {}", config.crawler.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, GistConfig, OutputConfig, DEFAULT_BASE_URL, DEFAULT_GIST_API_BASE,
    DEFAULT_GIST_DESCRIPTION, DEFAULT_GIST_FILENAME, DEFAULT_REQUEST_TIMEOUT_SECONDS,
    DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
