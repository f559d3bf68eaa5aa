//! Reading previously produced results back in

use crate::output::traits::OutputResult;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Path value that selects standard input
pub const STDIN_PATH: &str = "-";

/// Reads the whole file, or stdin when `path` is `-`
pub async fn read_file_or_stdin(path: &str) -> OutputResult<String> {
    if path == STDIN_PATH {
        read_to_string(tokio::io::stdin()).await
    } else {
        Ok(tokio::fs::read_to_string(Path::new(path)).await?)
    }
}

/// Reads a stream to its end
pub async fn read_to_string<R: AsyncRead + Unpin>(mut reader: R) -> OutputResult<String> {
    let mut content = String::new();
    reader.read_to_string(&mut content).await?;
    Ok(content)
}
