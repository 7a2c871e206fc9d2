//! OCR fallback: rasterise pages via pdfium and read them with tesseract.
//!
//! Scanned theses carry no text layer, so each selected page is rendered to a
//! PNG in a temporary directory and handed to the tesseract binary, whose
//! stdout is the page text. The subprocess route (rather than linking
//! libtesseract) keeps the build dependency-free and lets operators point the
//! pipeline at whatever tesseract install and language packs they have.
//!
//! A per-page tesseract failure is downgraded to a warning and an empty page;
//! only a failure to launch the binary at all (wrong path, not installed)
//! aborts the OCR pass, which the caller treats as "no text acquired".

use crate::config::{ExtractionConfig, PageBudget};
use crate::error::DocumentError;
use crate::pipeline::acquire::bind_pdfium;
use crate::pipeline::select;
use pdfium_render::prelude::*;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

// Pdfium renders in points (1/72 inch); scale to the configured DPI.
const POINTS_PER_INCH: f32 = 72.0;

/// Rasterise and OCR the selected pages. Blocking; call from
/// `spawn_blocking`.
pub(crate) fn ocr_pages_blocking(
    pdf_path: &Path,
    config: &ExtractionConfig,
    budget: Option<PageBudget>,
) -> Result<Vec<String>, DocumentError> {
    let pdfium = bind_pdfium(config.pdfium_lib_dir.as_deref())
        .map_err(|e| DocumentError::Ocr(e.to_string()))?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| DocumentError::Ocr(format!("cannot open PDF for OCR: {e:?}")))?;

    let pages = document.pages();
    let total = pages.len() as usize;

    let indices: Vec<usize> = match budget {
        Some(ref b) => select::bounded_page_indices(total, b),
        None => (0..total).collect(),
    };

    let temp_dir = tempfile::tempdir()
        .map_err(|e| DocumentError::Ocr(format!("cannot create temp dir: {e}")))?;

    let mut texts = Vec::with_capacity(indices.len());
    for idx in indices {
        match render_page_png(&pages, idx, config.ocr_dpi, temp_dir.path()) {
            Ok(png_path) => {
                texts.push(run_tesseract(config, &png_path, idx)?);
            }
            Err(e) => {
                warn!("rasterisation failed on page {}: {e}", idx + 1);
                texts.push(String::new());
            }
        }
    }

    debug!(
        "OCR pass complete: {} pages, {} chars",
        texts.len(),
        texts.iter().map(|t| t.len()).sum::<usize>()
    );

    Ok(texts)
}

/// Render one page to a PNG file scaled to the requested DPI.
fn render_page_png(
    pages: &PdfPages<'_>,
    idx: usize,
    dpi: u32,
    out_dir: &Path,
) -> Result<std::path::PathBuf, DocumentError> {
    let page = pages
        .get(idx as u16)
        .map_err(|e| DocumentError::Ocr(format!("page {}: {e:?}", idx + 1)))?;

    let target_width = (page.width().value / POINTS_PER_INCH * dpi as f32).round() as i32;
    let render_config = PdfRenderConfig::new().set_target_width(target_width.max(1));

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| DocumentError::Ocr(format!("render page {}: {e:?}", idx + 1)))?;

    let image = bitmap.as_image();
    let png_path = out_dir.join(format!("page-{:04}.png", idx + 1));
    image
        .save(&png_path)
        .map_err(|e| DocumentError::Ocr(format!("write PNG for page {}: {e}", idx + 1)))?;

    Ok(png_path)
}

/// Run tesseract on one PNG and return its stdout as the page text.
fn run_tesseract(
    config: &ExtractionConfig,
    png_path: &Path,
    idx: usize,
) -> Result<String, DocumentError> {
    let output = Command::new(&config.tesseract_path)
        .arg(png_path)
        .arg("stdout")
        .arg("-l")
        .arg(&config.ocr_language)
        .output()
        .map_err(|e| {
            DocumentError::Ocr(format!(
                "cannot run '{}': {e}",
                config.tesseract_path.display()
            ))
        })?;

    if !output.status.success() {
        // Tesseract writes diagnostics to stderr but often still produces
        // usable text on stdout; keep whatever came through.
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("tesseract warning on page {}: {}", idx + 1, stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
