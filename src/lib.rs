//! # thesis2csv
//!
//! Extract bibliographic metadata from thesis PDFs into a CSV table using a
//! local language model.
//!
//! ## Why this crate?
//!
//! Cataloguing a shelf of digitised theses by hand means opening each PDF,
//! hunting for the title, author, abstract, methodology, and conclusions, and
//! retyping them into a spreadsheet. This crate automates the loop: it pulls
//! text out of each PDF (falling back to OCR for scanned documents), asks a
//! locally hosted Ollama model a fixed set of questions about it, cleans up
//! the answers, and appends one row per document to a CSV that opens cleanly
//! in any spreadsheet application.
//!
//! ## Pipeline Overview
//!
//! ```text
//! directory of PDFs
//!  │
//!  ├─ 1. Acquire   native text layer via pdfium, OCR fallback via tesseract
//!  ├─ 2. Select    per-question page windows, or first/last page budget
//!  ├─ 3. Prompt    one prompt per question, or one combined prompt
//!  ├─ 4. Generate  Ollama /api/generate with retry + backoff
//!  ├─ 5. Clean     strip reasoning blocks, boilerplate, OCR noise
//!  └─ 6. Output    CSV row per document, flushed after every file
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use thesis2csv::{run_batch, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .input_dir("teses/")
//!         .output_csv("respostas.csv")
//!         .model("llama3.2")
//!         .build()?;
//!     let stats = run_batch(&config).await?;
//!     eprintln!("{} documento(s), {} via OCR",
//!         stats.processed_documents, stats.ocr_documents);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Model
//!
//! A batch only aborts for configuration problems, an unreadable input
//! directory, or an unwritable output file. Everything scoped to a single
//! document — corrupt PDFs, a missing tesseract install, an unreachable
//! model server — is logged and turned into a fixed sentinel answer, so the
//! output table always carries one row per input file with one cell per
//! question.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `thesis2csv` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! thesis2csv = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod questions;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{run_batch, run_batch_with_generator};
pub use config::{ExtractionConfig, ExtractionConfigBuilder, PageBudget, PromptMode};
pub use error::{DocumentError, ExtractError};
pub use extract::{extract_document, DocumentAnswers};
pub use output::{AnswerRow, BatchStats, CsvSink};
pub use pipeline::acquire::{AcquiredText, TextSource};
pub use pipeline::generate::{Generator, OllamaGenerator};
pub use progress::{BatchProgressCallback, NoopProgressCallback};
pub use questions::{default_questions, PageRange, QuestionSpec};
