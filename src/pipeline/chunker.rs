//! Prompt chunking - split document text into budget-respecting requests.
//!
//! Chunk boundaries are a pure function of the document text and the
//! budget, so identical inputs always produce identical chunks
//! (reproducible testing depends on this).

use std::ops::Range;

use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::pipeline::prompts::{format_extract_prompt, prompt_overhead, STRICT_RETRY_SUFFIX};
use crate::types::chunk::ExtractionChunk;
use crate::types::document::DocumentText;

/// Split document text into extraction chunks.
///
/// Page blocks are never split across chunks when a block alone fits the
/// budget; an oversized block is split at the nearest whitespace boundary
/// preceding the budget limit. Every serialized prompt, schema
/// instructions included, is at most `max_prompt_chars` long, and the
/// chunk segments concatenated in index order reconstruct `doc.text`
/// exactly.
pub fn chunk_document(
    doc: &DocumentText,
    schema_description: &str,
    max_prompt_chars: usize,
) -> Result<Vec<ExtractionChunk>> {
    // Reserve room for the strict-retry suffix so even a retried prompt
    // stays within the budget.
    let overhead = prompt_overhead(schema_description) + STRICT_RETRY_SUFFIX.len();
    let text_budget = max_prompt_chars
        .checked_sub(overhead)
        .filter(|b| *b > 0)
        .ok_or_else(|| ExtractError::Config {
            reason: format!(
                "prompt budget {} cannot fit the {}-byte schema instructions",
                max_prompt_chars, overhead
            ),
        })?;

    // Atoms: page blocks, with oversized blocks pre-split.
    let mut atoms: Vec<Range<usize>> = Vec::new();
    for span in &doc.spans {
        let range = span.start..span.end;
        if range.len() <= text_budget {
            atoms.push(range);
        } else {
            atoms.extend(split_oversized(&doc.text, range, text_budget));
        }
    }

    // Greedy pack: consecutive atoms share a chunk while they fit.
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for atom in atoms {
        match ranges.last_mut() {
            Some(current) if atom.end - current.start <= text_budget => {
                current.end = atom.end;
            }
            _ => ranges.push(atom),
        }
    }

    let chunks = ranges
        .into_iter()
        .enumerate()
        .map(|(index, range)| {
            let segment = doc.text[range.clone()].to_string();
            let prompt = format_extract_prompt(schema_description, &segment);
            ExtractionChunk {
                index,
                segment,
                range,
                prompt,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        chunks = chunks.len(),
        text_bytes = doc.text.len(),
        text_budget,
        "document chunked"
    );

    Ok(chunks)
}

/// Split one oversized block into budget-sized pieces at whitespace.
fn split_oversized(text: &str, range: Range<usize>, budget: usize) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut start = range.start;

    while range.end - start > budget {
        let mut limit = start + budget;
        while !text.is_char_boundary(limit) {
            limit -= 1;
        }
        if limit <= start {
            // Budget smaller than one multi-byte char; take the char whole.
            limit = start + text[start..].chars().next().map_or(1, |c| c.len_utf8());
        }

        let window = &text[start..limit];
        let cut = match window.rfind(char::is_whitespace) {
            Some(pos) => {
                let ws_len = window[pos..].chars().next().map_or(1, |c| c.len_utf8());
                start + pos + ws_len
            }
            None => limit, // no whitespace in the window, hard split
        };

        pieces.push(start..cut);
        start = cut;
    }

    pieces.push(start..range.end);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::assemble::assemble;
    use crate::types::page::{AcquisitionMethod, ResolvedPage};
    use proptest::prelude::*;

    const SCHEMA_DESC: &str = "- policyholder.name (string, required)\n- vehicle.chassisNumber (string, required)";

    fn doc_from_pages(texts: &[&str]) -> DocumentText {
        let pages = texts
            .iter()
            .enumerate()
            .map(|(i, t)| ResolvedPage::new(i, *t, AcquisitionMethod::Native))
            .collect();
        assemble(pages).unwrap()
    }

    fn reconstruct(chunks: &[ExtractionChunk]) -> String {
        chunks.iter().map(|c| c.segment.as_str()).collect()
    }

    /// A prompt budget leaving `extra` bytes of text room per chunk.
    fn budget_for(extra: usize) -> usize {
        prompt_overhead(SCHEMA_DESC) + STRICT_RETRY_SUFFIX.len() + extra
    }

    #[test]
    fn test_small_document_is_one_chunk() {
        let doc = doc_from_pages(&["short page one", "short page two"]);
        let chunks = chunk_document(&doc, SCHEMA_DESC, 24_000).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].segment, doc.text);
    }

    #[test]
    fn test_round_trip_reconstructs_document() {
        let doc = doc_from_pages(&[
            &"first page sentence. ".repeat(30),
            &"second page sentence. ".repeat(30),
            &"third page sentence. ".repeat(30),
        ]);
        let budget = budget_for(400);
        let chunks = chunk_document(&doc, SCHEMA_DESC, budget).unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(reconstruct(&chunks), doc.text);
    }

    #[test]
    fn test_page_blocks_not_split_when_they_fit() {
        let page = "word ".repeat(40); // 200 bytes
        let doc = doc_from_pages(&[&page, &page, &page]);
        let block_len = doc.spans[0].end - doc.spans[0].start;
        // Budget fits one block but not two.
        let budget = budget_for(block_len + 10);
        let chunks = chunk_document(&doc, SCHEMA_DESC, budget).unwrap();

        assert_eq!(chunks.len(), 3);
        for (chunk, span) in chunks.iter().zip(&doc.spans) {
            assert_eq!(chunk.range, span.start..span.end);
        }
    }

    #[test]
    fn test_oversized_page_splits_at_whitespace() {
        let page = "alpha beta gamma delta ".repeat(50);
        let doc = doc_from_pages(&[&page]);
        let budget = budget_for(100);
        let chunks = chunk_document(&doc, SCHEMA_DESC, budget).unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(reconstruct(&chunks), doc.text);
        // Every boundary except the last falls right after whitespace.
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                chunk.segment.ends_with(char::is_whitespace),
                "chunk {} should end at a whitespace boundary",
                chunk.index
            );
        }
    }

    #[test]
    fn test_no_prompt_exceeds_budget() {
        let doc = doc_from_pages(&[&"lorem ipsum dolor sit amet ".repeat(80)]);
        let budget = budget_for(256);
        let chunks = chunk_document(&doc, SCHEMA_DESC, budget).unwrap();

        for chunk in &chunks {
            assert!(chunk.prompt.len() <= budget);
        }
    }

    #[test]
    fn test_identical_input_identical_boundaries() {
        let doc = doc_from_pages(&[&"deterministic words here ".repeat(60)]);
        let budget = budget_for(300);

        let a = chunk_document(&doc, SCHEMA_DESC, budget).unwrap();
        let b = chunk_document(&doc, SCHEMA_DESC, budget).unwrap();

        let ranges_a: Vec<_> = a.iter().map(|c| c.range.clone()).collect();
        let ranges_b: Vec<_> = b.iter().map(|c| c.range.clone()).collect();
        assert_eq!(ranges_a, ranges_b);
    }

    #[test]
    fn test_budget_below_overhead_is_config_error() {
        let doc = doc_from_pages(&["page"]);
        let err = chunk_document(&doc, SCHEMA_DESC, 10).unwrap_err();
        assert!(matches!(err, ExtractError::Config { .. }));
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        // Bilingual policies carry CJK text; splits must stay on char
        // boundaries even without whitespace.
        let page = "保險單號碼第一二三四五六七八九十".repeat(40);
        let doc = doc_from_pages(&[&page]);
        let budget = budget_for(64);
        let chunks = chunk_document(&doc, SCHEMA_DESC, budget).unwrap();

        assert_eq!(reconstruct(&chunks), doc.text);
    }

    proptest! {
        #[test]
        fn prop_round_trip_and_budget(
            pages in proptest::collection::vec("[a-zA-Z0-9 .,\n]{1,400}", 1..6),
            extra_budget in 64usize..2000,
        ) {
            let refs: Vec<&str> = pages.iter().map(|s| s.as_str()).collect();
            // Skip the all-whitespace corner; the assembler rejects it.
            if refs.iter().all(|t| t.trim().is_empty()) {
                return Ok(());
            }
            let doc = doc_from_pages(&refs);
            let budget = budget_for(extra_budget);
            let chunks = chunk_document(&doc, SCHEMA_DESC, budget).unwrap();

            prop_assert_eq!(reconstruct(&chunks), doc.text.clone());
            for chunk in &chunks {
                prop_assert!(chunk.prompt.len() <= budget);
            }
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.index, i);
            }
        }
    }
}
