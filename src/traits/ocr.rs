//! OCR capability.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::page::PageImage;

/// Optical character recognition over one rasterized page.
///
/// Implementations wrap an OCR engine (tesseract, a vision API, ...).
/// The pipeline invokes this at most once per page, and only for pages
/// whose native text failed the trustworthiness check.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize text in a page image.
    ///
    /// An empty string is a valid result. Errors and timeouts are treated
    /// by the pipeline as empty OCR text, never as a run failure.
    async fn recognize(&self, image: &PageImage) -> Result<String>;
}
