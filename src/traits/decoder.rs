//! PDF decoding capability.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::page::DecodedPage;

/// Decodes raw PDF bytes into per-page images and native text.
///
/// Implementations wrap a PDF library (pdfium, poppler, ...). The core only
/// needs the rasterized image handle and whatever text the PDF's embedded
/// text layer yields, which may be an empty string for scanned documents.
#[async_trait]
pub trait PdfDecoder: Send + Sync {
    /// Decode a document into ordered pages.
    ///
    /// Returning an empty vector is legal and is mapped by the pipeline to
    /// [`ExtractError::EmptyDocument`](crate::error::ExtractError::EmptyDocument).
    async fn decode(&self, bytes: &[u8]) -> Result<Vec<DecodedPage>>;
}
