//! Error types for the thesis2csv library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the batch cannot proceed at all
//!   (unreadable input directory, invalid configuration, output file cannot
//!   be written). Returned as `Err(ExtractError)` from [`crate::batch`].
//!
//! * [`DocumentError`] — **Non-fatal**: something went wrong while handling a
//!   single document or a single generation call (corrupt PDF, OCR engine
//!   missing, Ollama unreachable). These never propagate past the document
//!   boundary; they are logged and converted into sentinel answer text so the
//!   batch keeps running and the output table stays complete.
//!
//! The separation is deliberate: an unattended overnight run over hundreds of
//! theses must survive any one bad file or a flaky generation service.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the thesis2csv library.
///
/// Per-document failures use [`DocumentError`] and surface as sentinel text
/// in the output CSV rather than being propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input directory could not be enumerated at all.
    #[error("cannot read input directory '{path}': {source}")]
    InputDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not create or write the output CSV file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A non-fatal error scoped to one document or one generation call.
///
/// Every variant is recovered locally: extraction errors trigger the OCR
/// fallback or an empty text result, generation errors become a fixed
/// sentinel answer string.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    /// The PDF could not be opened or parsed.
    #[error("PDF open failed: {0}")]
    PdfOpen(String),

    /// Page rasterisation or the tesseract subprocess failed.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// The generation request never produced a usable HTTP response.
    #[error("generation request failed: {0}")]
    Transport(String),

    /// The generation service answered with a non-success status.
    #[error("generation service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body parsed but did not contain the expected field.
    #[error("generation response missing 'response' field")]
    MalformedResponse,
}
