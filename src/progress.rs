//! Progress-callback trait for per-document batch events.
//!
//! Inject an `Arc<dyn BatchProgressCallback>` via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the batch works through the input directory.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a log file, or a UI without the
//! library knowing anything about how the host application communicates.
//! Processing is strictly sequential, so implementations never see
//! overlapping calls, but the trait is still `Send + Sync` so callbacks can
//! be shared across the async boundary.

/// Called by the batch runner as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any document is processed.
    ///
    /// # Arguments
    /// * `total_documents` — number of PDF files found in the input directory
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document's text acquisition begins.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position within the batch
    /// * `total` — total documents in the batch
    /// * `file_name` — the document's file name
    fn on_document_start(&self, index: usize, total: usize, file_name: &str) {
        let _ = (index, total, file_name);
    }

    /// Called after a document's row has been written to the output table.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position within the batch
    /// * `total` — total documents in the batch
    /// * `file_name` — the document's file name
    /// * `used_ocr` — whether the OCR fallback fired for this document
    fn on_document_complete(&self, index: usize, total: usize, file_name: &str, used_ocr: bool) {
        let _ = (index, total, file_name, used_ocr);
    }

    /// Called once after the last document.
    ///
    /// # Arguments
    /// * `processed` — documents that produced a row in the output table
    fn on_batch_complete(&self, processed: usize) {
        let _ = processed;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}
