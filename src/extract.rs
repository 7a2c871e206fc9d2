//! Per-document orchestration: acquire text, select segments, prompt, clean.
//!
//! This is the analogue of a single loop iteration in the batch: one PDF in,
//! one [`DocumentAnswers`] out. It never fails — every error class defined in
//! [`crate::error::DocumentError`] is absorbed here and turned into the
//! matching sentinel string, so the caller can unconditionally write a row.
//!
//! Two prompting strategies are supported (see
//! [`crate::config::PromptMode`]):
//!
//! * **Per-question** — each question gets its own prompt built from its own
//!   page window; empty windows short-circuit to a sentinel without costing
//!   a generation call.
//! * **Combined** — one prompt carries a bounded whole-document blob and all
//!   questions; the response is split on the separator token and padded when
//!   the model returns too few parts.

use crate::config::{ExtractionConfig, PromptMode};
use crate::error::DocumentError;
use crate::pipeline::acquire::{acquire_document, TextSource};
use crate::pipeline::generate::Generator;
use crate::pipeline::{postprocess, select};
use crate::prompts;
use crate::questions::{GENERATION_ERROR, GENERATION_FAILED, NO_SEGMENT_TEXT};
use std::path::Path;
use tracing::{debug, info, warn};

/// The answers produced for one document, in question order.
#[derive(Debug, Clone)]
pub struct DocumentAnswers {
    /// File name of the source PDF (no directory).
    pub file_name: String,
    /// One answer per configured question; sentinels where no answer exists.
    pub answers: Vec<String>,
    /// Whether the OCR fallback fired.
    pub used_ocr: bool,
    /// Generation calls that ended in a sentinel after retries.
    pub generation_failures: usize,
}

/// Extract answers for every configured question from one PDF.
///
/// The returned answer list always has exactly `config.questions.len()`
/// entries, whatever happened during extraction or generation.
pub async fn extract_document(
    pdf_path: &Path,
    generator: &dyn Generator,
    config: &ExtractionConfig,
) -> DocumentAnswers {
    let file_name = pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| pdf_path.display().to_string());

    info!("processing '{}'", file_name);

    let (answers, used_ocr, generation_failures) = match config.prompt_mode {
        PromptMode::PerQuestion => extract_per_question(pdf_path, generator, config).await,
        PromptMode::Combined => extract_combined(pdf_path, generator, config).await,
    };

    debug_assert_eq!(answers.len(), config.questions.len());
    DocumentAnswers {
        file_name,
        answers,
        used_ocr,
        generation_failures,
    }
}

async fn extract_per_question(
    pdf_path: &Path,
    generator: &dyn Generator,
    config: &ExtractionConfig,
) -> (Vec<String>, bool, usize) {
    let acquired = acquire_document(pdf_path, config, None).await;
    let used_ocr = acquired.source == TextSource::Ocr;

    if acquired.is_empty() {
        debug!("no text acquired, emitting sentinel row");
        let answers = vec![NO_SEGMENT_TEXT.to_string(); config.questions.len()];
        return (answers, used_ocr, 0);
    }

    let (answers, failures) = per_question_answers(&acquired.pages, generator, config).await;
    (answers, used_ocr, failures)
}

async fn extract_combined(
    pdf_path: &Path,
    generator: &dyn Generator,
    config: &ExtractionConfig,
) -> (Vec<String>, bool, usize) {
    let acquired = acquire_document(pdf_path, config, Some(config.page_budget)).await;
    let used_ocr = acquired.source == TextSource::Ocr;

    let blob = acquired.pages.join("\n");
    let (answers, failures) = combined_answers(&blob, generator, config).await;
    (answers, used_ocr, failures)
}

/// Answer each question from its own page window.
///
/// Questions whose resolved window contains no text get the no-text sentinel
/// without spending a generation call; everything else goes through the
/// generator and the response cleaner.
async fn per_question_answers(
    pages: &[String],
    generator: &dyn Generator,
    config: &ExtractionConfig,
) -> (Vec<String>, usize) {
    let total_pages = pages.len();
    let mut answers = Vec::with_capacity(config.questions.len());
    let mut failures = 0usize;

    for question in &config.questions {
        let indices = question.pages.resolve(total_pages);
        let segment = select::build_segment(pages, &indices);

        if segment.trim().is_empty() {
            debug!("'{}': empty segment, skipping generation", question.label);
            answers.push(NO_SEGMENT_TEXT.to_string());
            continue;
        }

        let prompt = prompts::per_question_prompt(&segment, &question.text);
        match generator.generate(&prompt).await {
            Ok(response) => answers.push(postprocess::clean_response(&response)),
            Err(e) => {
                warn!("'{}': generation failed: {e}", question.label);
                failures += 1;
                answers.push(sentinel_for(&e).to_string());
            }
        }
    }

    (answers, failures)
}

/// Answer every question from one prompt over the bounded document blob.
///
/// The single response is split on the separator, padded to the question
/// count, and cleaned slot by slot. A failed call fills every cell with the
/// matching sentinel but counts as one failure.
async fn combined_answers(
    blob: &str,
    generator: &dyn Generator,
    config: &ExtractionConfig,
) -> (Vec<String>, usize) {
    let question_count = config.questions.len();
    let blob = blob.trim();

    if blob.is_empty() {
        debug!("no text acquired, emitting sentinel row");
        return (vec![NO_SEGMENT_TEXT.to_string(); question_count], 0);
    }

    let blob = select::truncate_chars(blob, config.max_prompt_chars);
    let prompt = prompts::combined_prompt(blob, &config.questions);

    match generator.generate(&prompt).await {
        Ok(response) => {
            let parts = prompts::split_answers(&response, question_count);
            let answers = parts
                .iter()
                .map(|part| postprocess::clean_response(part))
                .collect();
            (answers, 0)
        }
        Err(e) => {
            warn!("combined generation failed: {e}");
            (vec![sentinel_for(&e).to_string(); question_count], 1)
        }
    }
}

/// Map a generation failure onto its sentinel: a response that arrived but
/// lacked the expected field is distinguishable from never getting one.
fn sentinel_for(error: &DocumentError) -> &'static str {
    match error {
        DocumentError::MalformedResponse => GENERATION_FAILED,
        _ => GENERATION_ERROR,
    }
}
