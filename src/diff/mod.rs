//! Diff engine: unified diff parsing, file selection, and the insertion report.

pub mod filter;
pub mod insertions;
pub mod parser;

use thiserror::Error;

/// Errors from the diff engine.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("failed to read diff: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("diff parse error: {0}")]
    ParseError(String),

    #[error("invalid exclude pattern: {0}")]
    InvalidPattern(String),
}

/// Read a unified diff from stdin until end of stream.
pub async fn read_diff_stdin() -> Result<String, DiffError> {
    use tokio::io::AsyncReadExt;
    let mut buf = String::new();
    tokio::io::stdin().read_to_string(&mut buf).await?;
    Ok(buf)
}
