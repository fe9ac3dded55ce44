//! Error types for pdfspot library.

use std::io;
use thiserror::Error;

/// Result type alias for pdfspot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, extracting or rendering.
///
/// Render cancellation is deliberately absent: a superseded render is
/// reported as [`crate::render::RenderOutcome::Cancelled`], not as an error.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No file was selected, or the selected file is empty.
    #[error("Please select a file first.")]
    EmptyInput,

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The extraction service answered with an error.
    #[error("{0}")]
    Extraction(String),

    /// The extraction payload could not be understood.
    #[error("Malformed extraction payload: {0}")]
    MalformedPayload(String),

    /// The rendering library refused to load the document.
    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    /// A page could not be decoded or drawn.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Zoom factor is not a positive finite number.
    #[error("Invalid zoom factor: {0}")]
    InvalidZoom(f32),

    /// Element identifier could not be parsed.
    #[error("Invalid element id: {0}")]
    InvalidElementId(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedPayload(err.to_string())
    }
}
