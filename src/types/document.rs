//! Document text - the assembled, page-delimited text of one run.

use serde::{Deserialize, Serialize};

use crate::types::page::{AcquisitionMethod, ResolvedPage};

/// Span of one page's block inside the concatenated document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    /// 0-based page index
    pub page_index: usize,

    /// Byte offset of the block start (inclusive)
    pub start: usize,

    /// Byte offset of the block end (exclusive)
    pub end: usize,
}

/// The assembled text of one document, with provenance.
///
/// Owned exclusively by a single extraction run and discarded when the run
/// completes. Pages that resolved to empty text are kept in [`Self::pages`]
/// for provenance but contribute no block to [`Self::text`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentText {
    /// All resolved pages in page order, empty ones included
    pub pages: Vec<ResolvedPage>,

    /// Concatenated page blocks, each introduced by a page delimiter
    pub text: String,

    /// Byte spans of the non-empty page blocks, in page order
    pub spans: Vec<PageSpan>,
}

impl DocumentText {
    /// Per-page acquisition method tags, in page order.
    pub fn method_tags(&self) -> Vec<(usize, AcquisitionMethod)> {
        self.pages.iter().map(|p| (p.index, p.method)).collect()
    }

    /// Number of pages that contributed text.
    pub fn populated_pages(&self) -> usize {
        self.spans.len()
    }

    /// Number of pages that required the OCR fallback.
    pub fn ocr_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.method == AcquisitionMethod::Ocr)
            .count()
    }
}
