//! Post-processing: deterministic cleanup of model responses.
//!
//! ## Why is post-processing necessary?
//!
//! Even well-prompted local models routinely disobey the "no explanations"
//! directive — they open with "Aqui está o resumo:", leak `<think>` reasoning
//! blocks, answer in English, or echo raw OCR garbage back as the answer.
//! This module applies cheap, deterministic rules that fix those quirks
//! without touching genuine content, so downstream spreadsheet analysis sees
//! either a clean answer or a recognisable sentinel.
//!
//! The rewrite rules are kept as a data table rather than inline control
//! flow: each rule has a name and a pattern, they run in declaration order,
//! and each is independently testable.
//!
//! ## Order
//!
//! Noise classification runs first on the raw text (a cleaned-up noise
//! string would no longer look like noise); thinking markers are stripped
//! before prefix rules so the prefix patterns see the real first line;
//! whitespace collapsing runs after all removals; the vocabulary table and
//! the hedge check run last on the final single-line text.

use crate::questions::{OCR_NOISE, UNCLEAR_CONTENT};
use once_cell::sync::Lazy;
use regex::Regex;

/// One declarative rewrite: matches of `pattern` become `replacement`.
struct RewriteRule {
    name: &'static str,
    pattern: &'static str,
    replacement: &'static str,
    /// Replace every match (true) or only the first (false).
    all: bool,
}

/// Ordered rewrite table. Patterns are anchored where the original
/// boilerplate only ever appears at the start of a response.
const REWRITE_RULES: &[RewriteRule] = &[
    RewriteRule {
        name: "reasoning-lead-in",
        pattern: r"(?i)^(okay|primeiro|vou tentar|preciso|então|bem|let me).*?(\.|\n)",
        replacement: "",
        all: false,
    },
    RewriteRule {
        name: "answer-prefix",
        pattern: r"(?i)^.*?(resposta|answer):\s*",
        replacement: "",
        all: false,
    },
    RewriteRule {
        name: "title-preamble",
        pattern: r"(?i)^O título.*?:\s*",
        replacement: "",
        all: false,
    },
    RewriteRule {
        name: "here-is-preamble",
        pattern: r"(?i)^Aqui está.*?:\s*",
        replacement: "",
        all: false,
    },
    RewriteRule {
        name: "methodology-preamble",
        pattern: r"(?i)^A metodologia.*?:\s*",
        replacement: "",
        all: false,
    },
    RewriteRule {
        name: "based-on-provided",
        pattern: r"(?i)^Based on the provided.*?:\s*",
        replacement: "",
        all: false,
    },
    RewriteRule {
        name: "based-on-text",
        pattern: r"(?i)^Based on the text.*?:\s*",
        replacement: "",
        all: false,
    },
    RewriteRule {
        name: "resumo-label",
        pattern: r"(?i)^Resumo[:\s]+",
        replacement: "",
        all: false,
    },
    RewriteRule {
        name: "analise-label",
        pattern: r"(?i)^Análise.*?:\s*",
        replacement: "",
        all: false,
    },
    RewriteRule {
        name: "objetivo-label",
        pattern: r"(?i)^Objetivo[:\s]+",
        replacement: "",
        all: false,
    },
    RewriteRule {
        name: "newlines-to-spaces",
        pattern: r"\n+",
        replacement: " ",
        all: true,
    },
    RewriteRule {
        name: "collapse-spaces",
        pattern: r"\s{2,}",
        replacement: " ",
        all: true,
    },
];

static COMPILED_RULES: Lazy<Vec<(&'static RewriteRule, Regex)>> = Lazy::new(|| {
    REWRITE_RULES
        .iter()
        .map(|rule| {
            let re = Regex::new(rule.pattern)
                .unwrap_or_else(|e| panic!("bad rewrite pattern '{}': {e}", rule.name));
            (rule, re)
        })
        .collect()
});

/// Known mistranslated or untranslated technical terms.
const VOCAB_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("FFT", "Transformada Rápida de Fourier"),
    ("Hamiltonian", "modelo Hamiltoniano"),
    ("paramagnetic", "paramagnético"),
    ("hyperfine", "hiperfino"),
    ("No.", "Conteúdo não identificado claramente no trecho analisado"),
];

static RE_ALLCAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z ]{5,}$").unwrap());
static RE_BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}$").unwrap());
static RE_THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<think>.*?(</think>|$)").unwrap());

/// Clean one model answer into a single spreadsheet-ready line.
///
/// Returns one of the fixed sentinels when the input classifies as OCR noise,
/// collapses to nothing, or is a hedged non-answer.
pub fn clean_response(input: &str) -> String {
    let text = input.trim();
    if text.is_empty() {
        return UNCLEAR_CONTENT.to_string();
    }
    if is_ocr_noise(text) {
        return OCR_NOISE.to_string();
    }

    let text = strip_thinking(text);
    let text = apply_rewrite_rules(&text);
    let text = apply_vocabulary(&text);
    let text = text.trim();

    if text.is_empty() {
        return UNCLEAR_CONTENT.to_string();
    }
    if is_hedged_non_answer(text) {
        return UNCLEAR_CONTENT.to_string();
    }
    text.to_string()
}

/// OCR-noise heuristics: long all-caps runs ("AAA…", letterhead fragments)
/// and bare 1–2 digit strings (page numbers read back as the answer).
pub fn is_ocr_noise(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.to_uppercase().starts_with("AAA")
        || RE_ALLCAPS.is_match(trimmed)
        || RE_BARE_NUMBER.is_match(trimmed)
}

/// Remove `<think>`-delimited reasoning blocks, then any leftover lines that
/// start with an angle bracket (unclosed markers, stray tags).
fn strip_thinking(text: &str) -> String {
    let without_blocks = RE_THINK_BLOCK.replace_all(text, "");
    without_blocks
        .lines()
        .filter(|line| !line.trim_start().starts_with('<'))
        .collect::<Vec<_>>()
        .join("\n")
}

fn apply_rewrite_rules(text: &str) -> String {
    let mut current = text.to_string();
    for (rule, re) in COMPILED_RULES.iter() {
        current = if rule.all {
            re.replace_all(&current, rule.replacement).into_owned()
        } else {
            re.replace(&current, rule.replacement).into_owned()
        };
    }
    current
}

fn apply_vocabulary(text: &str) -> String {
    let mut current = text.to_string();
    for (term, translation) in VOCAB_SUBSTITUTIONS {
        current = current.replace(term, translation);
    }
    current
}

/// Short answers that only say the text "does not present" something carry
/// no information; they are collapsed into the unclear-content sentinel.
fn is_hedged_non_answer(text: &str) -> bool {
    text.to_lowercase().contains("não apresenta") && text.split_whitespace().count() < 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::{OCR_NOISE, UNCLEAR_CONTENT};

    #[test]
    fn noise_all_caps() {
        assert!(is_ocr_noise("ABCDE"));
        assert!(is_ocr_noise("UNIVERSIDADE FEDERAL"));
        assert!(!is_ocr_noise("Abcde normal text"));
    }

    #[test]
    fn noise_aaa_prefix() {
        assert!(is_ocr_noise("aaah ruído"));
        assert!(is_ocr_noise("AAAB123"));
    }

    #[test]
    fn noise_bare_page_number() {
        assert!(is_ocr_noise("12"));
        assert!(is_ocr_noise("7"));
        assert!(!is_ocr_noise("123"));
        assert!(!is_ocr_noise("12 páginas"));
    }

    #[test]
    fn clean_replaces_noise_with_sentinel() {
        assert_eq!(clean_response("ABCDE"), OCR_NOISE);
        assert_eq!(clean_response("  12  "), OCR_NOISE);
    }

    #[test]
    fn strips_think_block() {
        let input = "<think>preciso analisar o texto</think>\nO objetivo é avaliar o modelo.";
        assert_eq!(clean_response(input), "O objetivo é avaliar o modelo.");
    }

    #[test]
    fn strips_unclosed_think_block() {
        let input = "<think>raciocínio sem fim";
        assert_eq!(clean_response(input), UNCLEAR_CONTENT);
    }

    #[test]
    fn strips_angle_bracket_lines() {
        let input = "<instruções internas>\nA tese estuda ressonância magnética.";
        assert_eq!(clean_response(input), "A tese estuda ressonância magnética.");
    }

    #[test]
    fn strips_here_is_preamble() {
        let input = "Aqui está o resumo solicitado: A tese analisa solos tropicais.";
        assert_eq!(clean_response(input), "A tese analisa solos tropicais.");
    }

    #[test]
    fn strips_answer_prefix() {
        let input = "Resposta: espectroscopia de alta resolução";
        assert_eq!(clean_response(input), "espectroscopia de alta resolução");
    }

    #[test]
    fn collapses_newlines_and_spaces() {
        let input = "linha um\n\nlinha    dois";
        assert_eq!(clean_response(input), "linha um linha dois");
    }

    #[test]
    fn vocabulary_substitution() {
        let input = "O estudo usa FFT e o modelo é paramagnetic.";
        let cleaned = clean_response(input);
        assert!(cleaned.contains("Transformada Rápida de Fourier"));
        assert!(cleaned.contains("paramagnético"));
        assert!(!cleaned.contains("FFT"));
    }

    #[test]
    fn hedged_short_answer_becomes_sentinel() {
        assert_eq!(clean_response("O texto não apresenta objetivo."), UNCLEAR_CONTENT);
        // Long hedged answers carry partial information and are kept.
        let long = "O texto não apresenta conclusões claras, mas indica que o \
                    método proposto reduz o erro em dez por cento.";
        assert!(clean_response(long).contains("reduz o erro"));
    }

    #[test]
    fn empty_input_becomes_sentinel() {
        assert_eq!(clean_response(""), UNCLEAR_CONTENT);
        assert_eq!(clean_response("   \n  "), UNCLEAR_CONTENT);
    }

    #[test]
    fn clean_passthrough_for_good_answer() {
        let input = "Análise do comportamento térmico de ligas metálicas, de Maria Silva.";
        // "Análise...:" prefix rule only fires when a colon follows.
        assert_eq!(clean_response(input), input);
    }

    #[test]
    fn rules_compile() {
        assert_eq!(COMPILED_RULES.len(), REWRITE_RULES.len());
    }
}
