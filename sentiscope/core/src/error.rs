use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`crate::session::TranscriptSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// Index outside the sentence collection.
    #[error("sentence index {index} out of range (collection has {len} sentences)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Collection length.
        len: usize,
    },
    /// Session could not be assembled from configuration.
    #[error("session setup failed: {0}")]
    Setup(#[from] anyhow::Error),
}

/// Errors raised by chart surfaces.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Payload could not be encoded.
    #[error("encoding chart payload: {0}")]
    Encode(#[from] serde_json::Error),
    /// Surface I/O failed.
    #[error("surface I/O at {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}
