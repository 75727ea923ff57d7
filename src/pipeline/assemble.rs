//! Document assembly - concatenate resolved pages into one text.

use crate::error::{ExtractError, Result};
use crate::types::document::{DocumentText, PageSpan};
use crate::types::page::ResolvedPage;

/// Render the delimiter line introducing one page's block.
///
/// Uses the printed 1-based page number; field values in insurance policies
/// are frequently anchored to one printed page (signature blocks,
/// schedules), and the delimiter lets the model cite that provenance.
pub fn page_delimiter(page_index: usize) -> String {
    format!("--- PAGE {} ---\n", page_index + 1)
}

/// Assemble resolved pages into one document text.
///
/// Pages are expected in page order (the resolver sorts them). Empty pages
/// are retained for provenance but contribute no block. Fails with
/// [`ExtractError::EmptyDocument`] only when every page yields zero-length
/// chosen text - the condition the HTTP layer maps to "unable to extract
/// text".
pub fn assemble(pages: Vec<ResolvedPage>) -> Result<DocumentText> {
    let mut text = String::new();
    let mut spans = Vec::new();

    for page in &pages {
        if page.is_empty() {
            continue;
        }
        let start = text.len();
        text.push_str(&page_delimiter(page.index));
        text.push_str(&page.text);
        text.push('\n');
        spans.push(PageSpan {
            page_index: page.index,
            start,
            end: text.len(),
        });
    }

    if spans.is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    Ok(DocumentText { pages, text, spans })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::page::AcquisitionMethod;

    #[test]
    fn test_assemble_orders_and_delimits() {
        let pages = vec![
            ResolvedPage::new(0, "first page", AcquisitionMethod::Native),
            ResolvedPage::new(1, "second page", AcquisitionMethod::Ocr),
        ];

        let doc = assemble(pages).unwrap();

        assert_eq!(
            doc.text,
            "--- PAGE 1 ---\nfirst page\n--- PAGE 2 ---\nsecond page\n"
        );
        assert_eq!(doc.spans.len(), 2);
        assert_eq!(doc.ocr_pages(), 1);
    }

    #[test]
    fn test_spans_are_contiguous_and_cover_text() {
        let pages = vec![
            ResolvedPage::new(0, "alpha", AcquisitionMethod::Native),
            ResolvedPage::new(1, "beta", AcquisitionMethod::Native),
            ResolvedPage::new(2, "gamma", AcquisitionMethod::Native),
        ];

        let doc = assemble(pages).unwrap();

        assert_eq!(doc.spans[0].start, 0);
        for pair in doc.spans.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(doc.spans.last().unwrap().end, doc.text.len());
    }

    #[test]
    fn test_empty_pages_skipped_but_tracked() {
        let pages = vec![
            ResolvedPage::new(0, "", AcquisitionMethod::Native),
            ResolvedPage::new(1, "content", AcquisitionMethod::Native),
        ];

        let doc = assemble(pages).unwrap();

        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.populated_pages(), 1);
        assert!(!doc.text.contains("--- PAGE 1 ---"));
        assert!(doc.text.contains("--- PAGE 2 ---"));
    }

    #[test]
    fn test_all_pages_empty_is_fatal() {
        let pages = vec![
            ResolvedPage::new(0, "  ", AcquisitionMethod::Native),
            ResolvedPage::new(1, "\n", AcquisitionMethod::Ocr),
        ];

        let err = assemble(pages).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument));
    }
}
