//! Output module for crawl results
//!
//! This module handles:
//! - Encoding and decoding the JSON result format
//! - Writing results to stdout or a file
//! - Reading results back from a file or stdin

mod input;
mod json;
mod traits;

pub use input::{read_file_or_stdin, read_to_string, STDIN_PATH};
pub use json::{from_json, open_output, to_json, JsonWriter};
pub use traits::{OutputError, OutputHandler, OutputResult};
