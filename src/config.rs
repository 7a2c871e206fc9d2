//! Configuration types for the extraction batch.
//!
//! All behaviour is controlled through [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to pass the whole pipeline configuration into [`crate::batch`]
//! at construction time — there are no global mutable constants anywhere in
//! the crate.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest.

use crate::error::ExtractError;
use crate::progress::BatchProgressCallback;
use crate::questions::{default_questions, QuestionSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// How many pages to extract when acquiring a whole-document text blob.
///
/// Large scanned theses run to hundreds of pages; OCR on all of them costs
/// minutes per document and most of the answer-bearing content sits at the
/// front (cover, abstract, introduction) and the back (conclusions). The
/// budget caps extraction to the first `first` and last `last` pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBudget {
    /// Pages taken from the start of the document.
    pub first: usize,
    /// Pages taken from the end, never overlapping the first block.
    pub last: usize,
}

impl Default for PageBudget {
    fn default() -> Self {
        Self { first: 20, last: 10 }
    }
}

/// How questions are sent to the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PromptMode {
    /// One prompt per question, each built from that question's page range.
    ///
    /// More calls, but each prompt carries only the pages likely to contain
    /// the answer, which works better for small-context models. (default)
    #[default]
    PerQuestion,
    /// One prompt for all questions, built from a bounded whole-document
    /// blob; answers come back joined by a separator token.
    Combined,
}

/// Configuration for a thesis-extraction batch.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use thesis2csv::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .input_dir("teses/")
///     .output_csv("respostas.csv")
///     .model("deepseek-r1")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Directory scanned (non-recursively) for `*.pdf` files.
    pub input_dir: PathBuf,

    /// Output CSV path, rewritten and flushed after every document.
    pub output_csv: PathBuf,

    /// Path to the tesseract binary. Default: `tesseract` (resolved via PATH).
    pub tesseract_path: PathBuf,

    /// Tesseract language code. Default: `por`.
    pub ocr_language: String,

    /// Rasterisation DPI for the OCR path. Range: 72–400. Default: 150.
    ///
    /// 150 DPI keeps per-page PNGs small while remaining sharp enough for
    /// tesseract on typeset thesis pages; bump to 300 for poor scans.
    pub ocr_dpi: u32,

    /// Directory containing the pdfium shared library. If `None`, the
    /// statically linked or system pdfium is used.
    pub pdfium_lib_dir: Option<PathBuf>,

    /// Ollama model identifier, e.g. "llama3.2", "deepseek-r1".
    pub model: String,

    /// Base URL of the Ollama server. Default: `http://localhost:11434`.
    pub base_url: String,

    /// Per-request timeout in seconds. `None` means no timeout: an
    /// unresponsive server blocks the batch indefinitely, which is the
    /// accepted trade-off for slow local models on long prompts. Default: `None`.
    pub request_timeout_secs: Option<u64>,

    /// Retry attempts after a failed generation call. Default: 2.
    ///
    /// Local Ollama failures are usually either transient (model still
    /// loading) or permanent (server down); two retries covers the former
    /// without stalling the batch for long on the latter.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (doubles per attempt). Default: 500.
    pub retry_backoff_ms: u64,

    /// The question set, in output-column order.
    pub questions: Vec<QuestionSpec>,

    /// Per-question or combined prompting. Default: [`PromptMode::PerQuestion`].
    pub prompt_mode: PromptMode,

    /// Acquisition bound used by combined mode. Default: first 20 + last 10.
    pub page_budget: PageBudget,

    /// Character cap on the document blob embedded in a combined prompt.
    /// Default: 6000.
    pub max_prompt_chars: usize,

    /// Optional per-document progress events.
    pub progress_callback: Option<Arc<dyn BatchProgressCallback>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_csv: PathBuf::from("respostas.csv"),
            tesseract_path: PathBuf::from("tesseract"),
            ocr_language: "por".to_string(),
            ocr_dpi: 150,
            pdfium_lib_dir: None,
            model: "llama3.2".to_string(),
            base_url: "http://localhost:11434".to_string(),
            request_timeout_secs: None,
            max_retries: 2,
            retry_backoff_ms: 500,
            questions: default_questions(),
            prompt_mode: PromptMode::default(),
            page_budget: PageBudget::default(),
            max_prompt_chars: 6000,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("input_dir", &self.input_dir)
            .field("output_csv", &self.output_csv)
            .field("tesseract_path", &self.tesseract_path)
            .field("ocr_language", &self.ocr_language)
            .field("ocr_dpi", &self.ocr_dpi)
            .field("pdfium_lib_dir", &self.pdfium_lib_dir)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("questions", &self.questions.len())
            .field("prompt_mode", &self.prompt_mode)
            .field("page_budget", &self.page_budget)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_csv = path.into();
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.config.ocr_dpi = dpi.clamp(72, 400);
        self
    }

    pub fn pdfium_lib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_dir = Some(dir.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn questions(mut self, questions: Vec<QuestionSpec>) -> Self {
        self.config.questions = questions;
        self
    }

    pub fn prompt_mode(mut self, mode: PromptMode) -> Self {
        self.config.prompt_mode = mode;
        self
    }

    pub fn page_budget(mut self, budget: PageBudget) -> Self {
        self.config.page_budget = budget;
        self
    }

    pub fn max_prompt_chars(mut self, n: usize) -> Self {
        self.config.max_prompt_chars = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(ExtractError::InvalidConfig("model must not be empty".into()));
        }
        if c.base_url.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "base_url must not be empty".into(),
            ));
        }
        if c.questions.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "at least one question is required".into(),
            ));
        }
        if c.ocr_dpi < 72 || c.ocr_dpi > 400 {
            return Err(ExtractError::InvalidConfig(format!(
                "OCR DPI must be 72–400, got {}",
                c.ocr_dpi
            )));
        }
        if c.page_budget.first == 0 && c.page_budget.last == 0 {
            return Err(ExtractError::InvalidConfig(
                "page budget must select at least one page".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ExtractionConfig::builder().build().unwrap();
        assert_eq!(config.ocr_dpi, 150);
        assert_eq!(config.page_budget, PageBudget { first: 20, last: 10 });
        assert_eq!(config.questions.len(), 5);
        assert_eq!(config.prompt_mode, PromptMode::PerQuestion);
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn empty_model_rejected() {
        let err = ExtractionConfig::builder().model("  ").build().unwrap_err();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn empty_questions_rejected() {
        let err = ExtractionConfig::builder()
            .questions(Vec::new())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("question"));
    }

    #[test]
    fn dpi_clamped_by_builder() {
        let config = ExtractionConfig::builder().ocr_dpi(9999).build().unwrap();
        assert_eq!(config.ocr_dpi, 400);
        let config = ExtractionConfig::builder().ocr_dpi(10).build().unwrap();
        assert_eq!(config.ocr_dpi, 72);
    }

    #[test]
    fn zero_page_budget_rejected() {
        let err = ExtractionConfig::builder()
            .page_budget(PageBudget { first: 0, last: 0 })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("page budget"));
    }
}
