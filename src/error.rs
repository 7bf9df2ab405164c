//! Error types for the coadoc library.

use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::model::Warning;

/// Result type alias for coadoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting, translating or rendering a COA.
///
/// Only [`Error::TranslationService`], [`Error::TranslationTimeout`] and
/// [`Error::NoTextExtracted`] end a job. The per-page variants are produced
/// inside component boundaries and converted to [`Warning`]s by the
/// orchestrator.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// A page could not be rasterized by any available strategy.
    #[error("Rendering failed for page {page}: {reason}")]
    Rendering { page: usize, reason: String },

    /// The OCR engine binary is not installed or cannot be started.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The OCR engine ran but returned an error.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// Error decoding or encoding image data.
    #[error("Image error: {0}")]
    Image(String),

    /// Every page was rejected by every extraction method.
    #[error("No text could be extracted from {page_count} page(s)")]
    NoTextExtracted {
        page_count: usize,
        warnings: Vec<Warning>,
    },

    /// The translation service failed (network, auth, model error).
    #[error("Translation service failed: {0}")]
    TranslationService(String),

    /// The translation service did not answer within the configured bound.
    #[error("Translation service timed out after {0:?}")]
    TranslationTimeout(Duration),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error serializing or deserializing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during document rendering.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Whether this error ends the whole translation job.
    pub fn is_job_fatal(&self) -> bool {
        matches!(
            self,
            Error::TranslationService(_) | Error::TranslationTimeout(_) | Error::NoTextExtracted { .. }
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            _ => Error::Image(err.to_string()),
        }
    }
}
