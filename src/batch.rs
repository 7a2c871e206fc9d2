//! Batch runner: enumerate PDFs, process them sequentially, persist rows.
//!
//! Documents run strictly one at a time. The bottleneck is the generation
//! service, which serves one request at a time on typical single-GPU hosts;
//! parallel documents would just queue behind each other while multiplying
//! memory use for rasterised pages.
//!
//! The output table is rewritten and flushed after every document, so an
//! interrupted run leaves a valid CSV covering everything processed so far.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::extract::extract_document;
use crate::output::{AnswerRow, BatchStats, CsvSink};
use crate::pipeline::generate::{Generator, OllamaGenerator};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Run a full batch with an Ollama generator built from `config`.
///
/// Returns aggregate statistics; per-document failures are absorbed into
/// sentinel answers and never abort the batch.
pub async fn run_batch(config: &ExtractionConfig) -> Result<BatchStats, ExtractError> {
    let generator = OllamaGenerator::new(config)?;
    run_batch_with_generator(config, &generator).await
}

/// Run a full batch against an arbitrary [`Generator`] implementation.
pub async fn run_batch_with_generator(
    config: &ExtractionConfig,
    generator: &dyn Generator,
) -> Result<BatchStats, ExtractError> {
    let started = Instant::now();
    let pdfs = list_pdfs(&config.input_dir)?;
    let total = pdfs.len();

    info!(
        "batch start: {} PDF(s) in '{}', model '{}'",
        total,
        config.input_dir.display(),
        config.model
    );
    if let Some(cb) = &config.progress_callback {
        cb.on_batch_start(total);
    }

    let labels: Vec<String> = config
        .questions
        .iter()
        .map(|q| q.label.clone())
        .collect();
    let mut sink = CsvSink::create(&config.output_csv, labels)?;

    let mut stats = BatchStats {
        total_documents: total,
        ..BatchStats::default()
    };

    for (i, pdf_path) in pdfs.iter().enumerate() {
        let index = i + 1;
        let file_name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| pdf_path.display().to_string());

        if let Some(cb) = &config.progress_callback {
            cb.on_document_start(index, total, &file_name);
        }
        info!("[{index}/{total}] {file_name}");

        let result = extract_document(pdf_path, generator, config).await;
        if result.used_ocr {
            stats.ocr_documents += 1;
        }
        if result.generation_failures > 0 {
            warn!(
                "[{index}/{total}] {} generation failure(s) for {file_name}",
                result.generation_failures
            );
        }
        stats.generation_failures += result.generation_failures;

        sink.append(AnswerRow {
            file: result.file_name,
            answers: result.answers,
        })?;
        stats.processed_documents += 1;

        if let Some(cb) = &config.progress_callback {
            cb.on_document_complete(index, total, &file_name, result.used_ocr);
        }
    }

    stats.duration_ms = started.elapsed().as_millis() as u64;
    if let Some(cb) = &config.progress_callback {
        cb.on_batch_complete(stats.processed_documents);
    }
    info!(
        "batch complete: {}/{} documents, {} via OCR, {} generation failure(s), {:.1}s",
        stats.processed_documents,
        stats.total_documents,
        stats.ocr_documents,
        stats.generation_failures,
        stats.duration_ms as f64 / 1000.0
    );

    Ok(stats)
}

/// List `*.pdf` files (case-insensitive) directly under `dir`, sorted by
/// file name so runs are deterministic.
pub(crate) fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ExtractError::InputDirUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut pdfs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
        })
        .collect();

    pdfs.sort();
    Ok(pdfs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_pdfs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf.bak"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let pdfs = list_pdfs(dir.path()).unwrap();
        let names: Vec<_> = pdfs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn missing_dir_is_fatal() {
        let err = list_pdfs(Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, ExtractError::InputDirUnreadable { .. }));
    }

    #[test]
    fn empty_dir_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_pdfs(dir.path()).unwrap().is_empty());
    }
}
