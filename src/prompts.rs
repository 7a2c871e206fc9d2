//! Prompt templates for the generation service.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the instruction wording (e.g.
//!    tightening the "no meta-commentary" directive) requires editing exactly
//!    one place.
//!
//! 2. **Testability** — unit tests can inspect prompts and the answer-split
//!    logic without a running Ollama server.
//!
//! Both templates instruct the model to answer in Portuguese with short,
//! direct sentences and no reasoning or introductions; local models ignore
//! such directives often enough that [`crate::pipeline::postprocess`] cleans
//! up what slips through.

use crate::questions::{QuestionSpec, NOT_FOUND};

/// Separator token the combined prompt asks the model to place between
/// answers. Chosen because it essentially never occurs in thesis text or in
/// model output, so splitting on it is unambiguous.
pub const ANSWER_SEPARATOR: &str = "|||";

/// Build the prompt for one question over its selected page segment.
pub fn per_question_prompt(segment: &str, question: &str) -> String {
    format!(
        "A seguir está o conteúdo de uma tese. Leia atentamente e responda \
         com objetividade e sem explicações. Não repita a pergunta. Responda \
         apenas em português.\n\n\
         {segment}\n\n\
         Responda com frases curtas e diretas, evitando justificativas ou \
         frases introdutórias. Evite dizer que não há conteúdo se houver \
         informação parcial. Responda somente com a informação solicitada:\n\n\
         {question}"
    )
}

/// Build the single prompt that asks every question at once.
///
/// The model is told to join its answers with [`ANSWER_SEPARATOR`]; the
/// response is later split by [`split_answers`].
pub fn combined_prompt(text: &str, questions: &[QuestionSpec]) -> String {
    let mut prompt = String::with_capacity(text.len() + 512);
    prompt.push_str(
        "Com base no texto da tese abaixo, responda diretamente (sem \
         explicações) separando as respostas com ' ||| ' :\n",
    );
    for q in questions {
        prompt.push_str(&q.text);
        prompt.push('\n');
    }
    prompt.push_str("\nTEXTO DA TESE:\n");
    prompt.push_str(text);
    prompt.push_str("\n\nFormato da resposta: ");
    for i in 1..=questions.len() {
        if i > 1 {
            prompt.push_str(" ||| ");
        }
        prompt.push_str(&format!("Resposta {i}"));
    }
    prompt
}

/// Split a combined response into exactly `count` answers.
///
/// The model frequently returns fewer parts than asked (it merges answers or
/// stops early); missing slots are padded with the not-found sentinel so the
/// output row always has one cell per question. Surplus parts are dropped,
/// and a blank response pads every slot uniformly.
pub fn split_answers(response: &str, count: usize) -> Vec<String> {
    if response.trim().is_empty() {
        return vec![NOT_FOUND.to_string(); count];
    }
    let mut answers: Vec<String> = response
        .split(ANSWER_SEPARATOR)
        .map(|part| part.trim().to_string())
        .collect();
    answers.truncate(count);
    while answers.len() < count {
        answers.push(NOT_FOUND.to_string());
    }
    answers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::default_questions;

    #[test]
    fn per_question_prompt_embeds_segment_and_question() {
        let p = per_question_prompt("texto da página", "Qual é o objetivo?");
        assert!(p.contains("texto da página"));
        assert!(p.contains("Qual é o objetivo?"));
        assert!(p.contains("apenas em português"));
    }

    #[test]
    fn combined_prompt_lists_every_question() {
        let questions = default_questions();
        let p = combined_prompt("corpo da tese", &questions);
        for q in &questions {
            assert!(p.contains(&q.text), "missing question: {}", q.text);
        }
        assert!(p.contains("' ||| '"));
        assert!(p.contains("Resposta 5"));
    }

    #[test]
    fn split_exact_count() {
        let parts = split_answers("a ||| b ||| c", 3);
        assert_eq!(parts, vec!["a", "b", "c"]);
    }

    #[test]
    fn split_pads_missing_parts() {
        let parts = split_answers("a ||| b ||| c", 5);
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[2], "c");
        assert_eq!(parts[3], NOT_FOUND);
        assert_eq!(parts[4], NOT_FOUND);
    }

    #[test]
    fn split_drops_surplus_parts() {
        let parts = split_answers("a ||| b ||| c ||| d", 2);
        assert_eq!(parts, vec!["a", "b"]);
    }

    #[test]
    fn split_blank_response_is_all_sentinels() {
        // Every slot pads the same way; slot 0 must not come out empty.
        for response in ["", "   \n  "] {
            let parts = split_answers(response, 3);
            assert_eq!(parts, vec![NOT_FOUND; 3]);
        }
    }

    #[test]
    fn split_trims_whitespace_around_parts() {
        let parts = split_answers("  um  |||  dois \n", 2);
        assert_eq!(parts, vec!["um", "dois"]);
    }
}
