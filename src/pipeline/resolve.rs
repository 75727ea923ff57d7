//! Page text resolution - decide, per page, between native text and OCR.

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::traits::ocr::OcrEngine;
use crate::types::config::PipelineConfig;
use crate::types::page::{AcquisitionMethod, DecodedPage, ResolvedPage};

/// Whether natively extracted text is trustworthy on its own.
///
/// Native text is trusted when its trimmed length meets the configured
/// minimum AND enough of its non-whitespace characters are alphanumeric.
/// Scanned-image-only PDFs typically fail the first check; PDFs with a
/// broken text layer (glyph soup) fail the second.
pub fn native_text_trusted(text: &str, config: &PipelineConfig) -> bool {
    let trimmed = text.trim();
    if trimmed.len() < config.min_native_chars {
        return false;
    }

    let mut total = 0usize;
    let mut alnum = 0usize;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            continue;
        }
        total += 1;
        if c.is_alphanumeric() {
            alnum += 1;
        }
    }
    if total == 0 {
        return false;
    }
    (alnum as f64) / (total as f64) >= config.min_alnum_ratio
}

/// Resolve one page: keep trustworthy native text, otherwise fall back to
/// OCR at most once.
///
/// OCR errors and timeouts are treated as empty OCR text. When OCR yields
/// nothing, the page keeps whatever native text existed; a page with no
/// extractable text at all is valid input to downstream stages, not an
/// error.
pub async fn resolve_page<O: OcrEngine>(
    page: DecodedPage,
    ocr: &O,
    config: &PipelineConfig,
) -> ResolvedPage {
    if native_text_trusted(&page.native_text, config) {
        debug!(page = page.index, chars = page.native_text.len(), "native text trusted");
        return ResolvedPage::new(page.index, page.native_text, AcquisitionMethod::Native);
    }

    debug!(
        page = page.index,
        native_chars = page.native_text.trim().len(),
        "native text untrustworthy, attempting OCR"
    );

    let ocr_text = match timeout(config.ocr_timeout, ocr.recognize(&page.image)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!(page = page.index, error = %e, "OCR failed, treating as empty");
            String::new()
        }
        Err(_) => {
            warn!(page = page.index, "OCR timed out, treating as empty");
            String::new()
        }
    };

    if ocr_text.trim().is_empty() {
        // OCR produced nothing usable; keep the native text, garbled or not.
        return ResolvedPage::new(page.index, page.native_text, AcquisitionMethod::Native);
    }

    ResolvedPage::new(page.index, ocr_text, AcquisitionMethod::Ocr)
}

/// Resolve all pages concurrently, bounded by the shared semaphore.
///
/// Completion order does not matter: results are re-ordered by page index
/// before assembly.
pub async fn resolve_pages<O: OcrEngine>(
    pages: Vec<DecodedPage>,
    ocr: &O,
    config: &PipelineConfig,
    semaphore: Arc<Semaphore>,
) -> Vec<ResolvedPage> {
    let futures = pages.into_iter().map(|page| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = semaphore.acquire().await.expect("semaphore never closed");
            resolve_page(page, ocr, config).await
        }
    });

    let mut resolved: Vec<ResolvedPage> = join_all(futures).await;
    resolved.sort_by_key(|p| p.index);
    resolved
}
