//! Page types - decoded and resolved pages.

use serde::{Deserialize, Serialize};

/// An opaque handle to one rasterized page.
///
/// The core never inspects the pixel data; it only passes the handle to
/// the OCR capability.
#[derive(Debug, Clone, Default)]
pub struct PageImage {
    /// 0-based page index within the document
    pub index: usize,

    /// Encoded image bytes (format is a contract between decoder and OCR)
    pub bytes: Vec<u8>,
}

impl PageImage {
    /// Create a page image.
    pub fn new(index: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            bytes: bytes.into(),
        }
    }
}

/// One page as produced by the PDF decoder, before text resolution.
#[derive(Debug, Clone)]
pub struct DecodedPage {
    /// 0-based page index
    pub index: usize,

    /// Rasterized page image for the OCR fallback
    pub image: PageImage,

    /// Text from the PDF's embedded text layer (may be empty)
    pub native_text: String,
}

impl DecodedPage {
    /// Create a decoded page.
    pub fn new(index: usize, native_text: impl Into<String>) -> Self {
        Self {
            index,
            image: PageImage::new(index, Vec::new()),
            native_text: native_text.into(),
        }
    }

    /// Attach the rasterized image.
    pub fn with_image(mut self, image: PageImage) -> Self {
        self.image = image;
        self
    }
}

/// How a page's chosen text was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionMethod {
    /// Text came from the PDF's embedded text layer
    Native,

    /// Text came from OCR over the rasterized page image
    Ocr,
}

/// One page after text resolution. Immutable from here on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPage {
    /// 0-based page index
    pub index: usize,

    /// The chosen text for this page (may be empty)
    pub text: String,

    /// How the chosen text was acquired
    pub method: AcquisitionMethod,
}

impl ResolvedPage {
    /// Create a resolved page.
    pub fn new(index: usize, text: impl Into<String>, method: AcquisitionMethod) -> Self {
        Self {
            index,
            text: text.into(),
            method,
        }
    }

    /// Whether this page contributed any usable text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_page_emptiness() {
        let blank = ResolvedPage::new(0, "  \n\t ", AcquisitionMethod::Native);
        assert!(blank.is_empty());

        let page = ResolvedPage::new(1, "Policy No. 12345", AcquisitionMethod::Ocr);
        assert!(!page.is_empty());
    }
}
