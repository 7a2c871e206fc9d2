//! Text acquisition: per-page text from the PDF text layer, with OCR fallback.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread so the runtime worker threads never stall during extraction.
//!
//! ## Fail-soft contract
//!
//! Nothing in this module returns an error to its caller. A corrupt PDF, a
//! missing pdfium library, or a broken tesseract install all degrade to an
//! empty [`AcquiredText`]; the document then appears in the output table with
//! sentinel answers instead of aborting the batch. Failures are logged at
//! `warn` so an operator can tell afterwards which files produced nothing.

use crate::config::{ExtractionConfig, PageBudget};
use crate::error::DocumentError;
use crate::pipeline::{ocr, select};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Where the page text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// The PDF carried a usable embedded text layer.
    NativeLayer,
    /// The text layer was empty; pages were rasterised and OCRed.
    Ocr,
    /// Neither path produced any text.
    Empty,
}

/// Per-page text for one document.
#[derive(Debug, Clone)]
pub struct AcquiredText {
    /// Extracted page texts. When acquisition ran without a budget the vector
    /// index equals the 0-based page index; with a budget it holds only the
    /// bounded subset in reading order and is only suitable for
    /// concatenation.
    pub pages: Vec<String>,
    /// Which extraction path produced the text.
    pub source: TextSource,
}

impl AcquiredText {
    fn empty() -> Self {
        Self {
            pages: Vec::new(),
            source: TextSource::Empty,
        }
    }

    /// True when no usable text was acquired at all.
    pub fn is_empty(&self) -> bool {
        self.source == TextSource::Empty
    }
}

/// Bind to pdfium, preferring an explicitly configured library directory.
pub(crate) fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, DocumentError> {
    let bindings = match lib_dir {
        Some(dir) => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| DocumentError::PdfOpen(format!("pdfium binding failed: {e:?}")))?;
    Ok(Pdfium::new(bindings))
}

/// Acquire per-page text for one document.
///
/// Attempts the native text layer first; if the whole document comes back
/// blank (scanned thesis with no embedded text), falls back to OCR exactly
/// once. `budget` bounds extraction to the first/last pages on *both* paths
/// and is used by combined-mode acquisition; per-question mode passes `None`
/// so the page vector stays index-aligned with the document.
pub async fn acquire_document(
    pdf_path: &Path,
    config: &ExtractionConfig,
    budget: Option<PageBudget>,
) -> AcquiredText {
    let path = pdf_path.to_path_buf();
    let lib_dir = config.pdfium_lib_dir.clone();

    let native = tokio::task::spawn_blocking(move || {
        extract_native_blocking(&path, lib_dir.as_deref(), budget)
    })
    .await
    .unwrap_or_else(|e| Err(DocumentError::PdfOpen(format!("extraction task panicked: {e}"))));

    match native {
        Ok(pages) if !all_blank(&pages) => {
            debug!("native text layer: {} pages", pages.len());
            return AcquiredText {
                pages,
                source: TextSource::NativeLayer,
            };
        }
        Ok(_) => {
            info!(
                "'{}' has no text layer, applying OCR",
                pdf_path.display()
            );
        }
        Err(e) => {
            warn!("native extraction failed for '{}': {e}", pdf_path.display());
        }
    }

    let path = pdf_path.to_path_buf();
    let cfg = config.clone();
    let ocr_result =
        tokio::task::spawn_blocking(move || ocr::ocr_pages_blocking(&path, &cfg, budget))
            .await
            .unwrap_or_else(|e| Err(DocumentError::Ocr(format!("OCR task panicked: {e}"))));

    match ocr_result {
        Ok(pages) if !all_blank(&pages) => AcquiredText {
            pages,
            source: TextSource::Ocr,
        },
        Ok(_) => {
            warn!("OCR produced no text for '{}'", pdf_path.display());
            AcquiredText::empty()
        }
        Err(e) => {
            warn!("OCR failed for '{}': {e}", pdf_path.display());
            AcquiredText::empty()
        }
    }
}

/// Blocking text-layer extraction via pdfium.
fn extract_native_blocking(
    pdf_path: &Path,
    lib_dir: Option<&Path>,
    budget: Option<PageBudget>,
) -> Result<Vec<String>, DocumentError> {
    let pdfium = bind_pdfium(lib_dir)?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| DocumentError::PdfOpen(format!("{e:?}")))?;

    let pages = document.pages();
    let total = pages.len() as usize;
    debug!("PDF loaded: {} pages", total);

    let indices: Vec<usize> = match budget {
        Some(ref b) => select::bounded_page_indices(total, b),
        None => (0..total).collect(),
    };

    let mut texts = Vec::with_capacity(indices.len());
    for idx in indices {
        let text = match pages.get(idx as u16) {
            Ok(page) => match page.text() {
                Ok(t) => t.all(),
                Err(e) => {
                    warn!("text extraction failed on page {}: {e:?}", idx + 1);
                    String::new()
                }
            },
            Err(e) => {
                warn!("cannot open page {}: {e:?}", idx + 1);
                String::new()
            }
        };
        texts.push(text);
    }

    Ok(texts)
}

/// True when every page is empty or whitespace-only.
fn all_blank(pages: &[String]) -> bool {
    pages.iter().all(|p| p.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_blank_detects_whitespace_pages() {
        assert!(all_blank(&[]));
        assert!(all_blank(&["".into(), "  \n\t ".into()]));
        assert!(!all_blank(&["".into(), "texto".into()]));
    }

    #[test]
    fn empty_acquired_text_reports_empty() {
        let acquired = AcquiredText::empty();
        assert!(acquired.is_empty());
        assert!(acquired.pages.is_empty());
    }

    #[tokio::test]
    async fn nonexistent_pdf_fails_soft() {
        let config = ExtractionConfig::default();
        let acquired =
            acquire_document(Path::new("/no/such/file.pdf"), &config, None).await;
        assert!(acquired.is_empty());
        assert_eq!(acquired.source, TextSource::Empty);
    }
}
