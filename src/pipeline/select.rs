//! Segment selection: turn page ranges into prompt text.
//!
//! Everything here is a pure function over already-extracted page text, which
//! is what makes the selection logic trivially testable — no PDFs, no OCR, no
//! network. Resolution of a [`crate::questions::PageRange`] against the real
//! page count lives on the range type itself; this module handles the
//! bounded first/last subset used for whole-document acquisition and the
//! final segment assembly.

use crate::config::PageBudget;

/// Page indices for the bounded first-K + last-M acquisition subset.
///
/// The last block is computed against the pages *remaining after* the first
/// block, so a short document never double-counts a page or indexes out of
/// range: with `total = 25` and a 20/10 budget the result is pages 0–19 and
/// 20–24.
pub fn bounded_page_indices(total: usize, budget: &PageBudget) -> Vec<usize> {
    let first = budget.first.min(total);
    let last = budget.last.min(total - first);
    (0..first).chain(total - last..total).collect()
}

/// Join the selected page texts in index order, newline-separated.
///
/// Indices past the end of `pages` are skipped; an empty or whitespace-only
/// result means "no content for this question" and callers must emit the
/// sentinel answer without a generation call.
pub fn build_segment(pages: &[String], indices: &[usize]) -> String {
    let parts: Vec<&str> = indices
        .iter()
        .filter_map(|&i| pages.get(i))
        .map(|s| s.as_str())
        .collect();
    parts.join("\n")
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("page {i}")).collect()
    }

    #[test]
    fn bounded_indices_long_document() {
        let budget = PageBudget { first: 20, last: 10 };
        let indices = bounded_page_indices(100, &budget);
        assert_eq!(indices.len(), 30);
        assert_eq!(indices[0], 0);
        assert_eq!(indices[19], 19);
        assert_eq!(indices[20], 90);
        assert_eq!(indices[29], 99);
    }

    #[test]
    fn bounded_indices_short_document_no_overlap() {
        let budget = PageBudget { first: 20, last: 10 };
        // 25 pages: first 20, then only 5 remain for the tail.
        let indices = bounded_page_indices(25, &budget);
        assert_eq!(indices, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn bounded_indices_tiny_document() {
        let budget = PageBudget { first: 20, last: 10 };
        assert_eq!(bounded_page_indices(3, &budget), vec![0, 1, 2]);
        assert_eq!(bounded_page_indices(0, &budget), Vec::<usize>::new());
    }

    #[test]
    fn bounded_indices_exact_boundary() {
        let budget = PageBudget { first: 20, last: 10 };
        let indices = bounded_page_indices(30, &budget);
        assert_eq!(indices, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn segment_joins_in_index_order() {
        let p = pages(5);
        assert_eq!(build_segment(&p, &[0, 2, 4]), "page 0\npage 2\npage 4");
    }

    #[test]
    fn segment_skips_out_of_range_indices() {
        let p = pages(3);
        assert_eq!(build_segment(&p, &[1, 7, 2]), "page 1\npage 2");
    }

    #[test]
    fn segment_empty_selection() {
        let p = pages(3);
        assert_eq!(build_segment(&p, &[]), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "conclusão";
        assert_eq!(truncate_chars(text, 9), "conclusão");
        assert_eq!(truncate_chars(text, 8), "conclusã");
        assert_eq!(truncate_chars(text, 100), text);
        assert_eq!(truncate_chars(text, 0), "");
    }
}
