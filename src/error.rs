//! Crate-wide error type

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// pdf-extract panics on some malformed documents instead of returning an error
    #[error("PDF extraction panicked (malformed document): {0}")]
    PdfPanicked(String),

    #[error("Invalid policy JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid noise pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}
