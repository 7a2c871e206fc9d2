//! Pipeline stages for thesis metadata extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. a different OCR engine) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! acquire ──▶ select ──▶ prompts ──▶ generate ──▶ postprocess
//! (pdfium/OCR) (pages)   (template)  (Ollama)     (cleanup)
//! ```
//!
//! 1. [`acquire`] — per-page text via the PDF text layer; OCR fallback when
//!    the document is image-only. Runs in `spawn_blocking` because pdfium is
//!    not async-safe.
//! 2. [`select`]  — resolve page ranges against the real page count and join
//!    the selected page texts into a prompt segment.
//! 3. [`generate`] — drive the Ollama call with retry/backoff; the only
//!    stage with network I/O.
//! 4. [`postprocess`] — deterministic rewrite rules to strip reasoning
//!    markers, boilerplate prefixes, and OCR noise from model output.

pub mod acquire;
pub mod generate;
pub mod ocr;
pub mod postprocess;
pub mod select;
