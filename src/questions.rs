//! Question specifications and the sentinel vocabulary.
//!
//! A [`QuestionSpec`] couples the question text sent to the model with a
//! [`PageRange`] describing where in the document the answer is expected to
//! live. Theses follow a rigid structure (cover page, abstract, introduction,
//! methodology, conclusions at the end), so fixed page windows per question
//! keep prompts small enough for a local model's context while still hitting
//! the right sections most of the time.
//!
//! The sentinel strings below are part of the output contract: downstream
//! analysis recognises them as "no data", so they must stay stable and must
//! never collide with plausible model output.

use serde::{Deserialize, Serialize};

// ── Sentinel answers ─────────────────────────────────────────────────────

/// Combined-mode padding when the model returns fewer parts than questions.
pub const NOT_FOUND: &str = "Não encontrado";

/// The resolved page range contained no usable text.
pub const NO_SEGMENT_TEXT: &str = "Texto não encontrado nas páginas indicadas.";

/// The raw response looked like OCR garbage rather than an answer.
pub const OCR_NOISE: &str = "Texto com ruído OCR - não interpretado.";

/// The generation service answered, but without the expected field.
pub const GENERATION_FAILED: &str = "Não foi possível gerar resposta";

/// The generation service could not be reached at all.
pub const GENERATION_ERROR: &str = "Erro na chamada ao modelo";

/// The answer was too hedged or too empty to be useful.
pub const UNCLEAR_CONTENT: &str = "Conteúdo não identificado claramente no trecho analisado.";

// ── Page ranges ──────────────────────────────────────────────────────────

/// Which pages of a document are relevant to a question.
///
/// Resolved against the actual page count by [`PageRange::resolve`]; the
/// configured indices are hints, never hard requirements, so a short document
/// simply yields fewer pages instead of an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PageRange {
    /// Explicit 0-based page indices, in the order they should be read.
    Explicit(Vec<usize>),
    /// The last `n` pages of the document, however many that turns out to be.
    LastN(usize),
}

impl PageRange {
    /// Resolve the range into concrete page indices for a document with
    /// `total_pages` pages.
    ///
    /// Explicit indices at or past the end are silently dropped. `LastN(n)`
    /// on a document with fewer than `n` pages selects the whole document.
    pub fn resolve(&self, total_pages: usize) -> Vec<usize> {
        match self {
            PageRange::Explicit(indices) => indices
                .iter()
                .copied()
                .filter(|&i| i < total_pages)
                .collect(),
            PageRange::LastN(n) => (total_pages.saturating_sub(*n)..total_pages).collect(),
        }
    }
}

/// One question posed per document: CSV column label, prompt text, and the
/// page window to search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSpec {
    /// Column header in the output CSV.
    pub label: String,
    /// Question text embedded in the prompt, verbatim.
    pub text: String,
    /// Pages whose text is concatenated into the prompt segment.
    pub pages: PageRange,
}

impl QuestionSpec {
    pub fn new(label: impl Into<String>, text: impl Into<String>, pages: PageRange) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            pages,
        }
    }
}

/// The default question set for Brazilian thesis metadata extraction.
///
/// The page windows are calibration defaults, not semantics: title and author
/// sit on the cover page, the abstract and objective in the front matter, the
/// methodology after it, and conclusions somewhere in the final 50 pages.
pub fn default_questions() -> Vec<QuestionSpec> {
    vec![
        QuestionSpec::new(
            "Título e Autor",
            "1. Qual é o título da tese e o nome do autor(a)?",
            PageRange::Explicit(vec![0]),
        ),
        QuestionSpec::new(
            "Resumo",
            "2. Resuma o conteúdo principal da tese em até 3 frases.",
            PageRange::Explicit((5..20).collect()),
        ),
        QuestionSpec::new(
            "Objetivo",
            "3. Qual é o objetivo principal desta tese?",
            PageRange::Explicit((8..28).collect()),
        ),
        QuestionSpec::new(
            "Metodologia",
            "4. Descreva brevemente a metodologia aplicada na tese.",
            PageRange::Explicit((10..30).collect()),
        ),
        QuestionSpec::new(
            "Conclusões",
            "5. Quais são as principais conclusões ou resultados apresentados na tese?",
            PageRange::LastN(50),
        ),
    ]
}
