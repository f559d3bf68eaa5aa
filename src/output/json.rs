//! JSON encoding of crawl results
//!
//! The produced artifact is a JSON array of
//! `{id, title, date, img: {src, width, height, ratio}}` objects in the order
//! they were given, which is ascending id order for a crawl result.

use crate::comic::ComicRecord;
use crate::output::traits::{OutputHandler, OutputResult};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Encodes comics as a compact JSON array
pub fn to_json(comics: &[ComicRecord]) -> OutputResult<String> {
    Ok(serde_json::to_string(comics)?)
}

/// Decodes a JSON array produced by `to_json`
pub fn from_json(json: &str) -> OutputResult<Vec<ComicRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Writes the JSON array, followed by a newline, to any writer
pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputHandler for JsonWriter<W> {
    fn write_comics(&mut self, comics: &[ComicRecord]) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, comics)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Opens the output sink: the given file, or stdout when no path is set
///
/// An existing file is truncated.
pub fn open_output(path: Option<&Path>) -> OutputResult<Box<dyn OutputHandler>> {
    match path {
        Some(path) => {
            tracing::debug!("Writing result to {}", path.display());
            Ok(Box::new(JsonWriter::new(File::create(path)?)))
        }
        None => Ok(Box::new(JsonWriter::new(io::stdout()))),
    }
}
