//! Trait abstractions for the external capabilities the pipeline consumes.
//!
//! The pipeline never talks to a PDF library, an OCR engine, or an LLM
//! provider directly. Each capability is injected behind a trait so the
//! whole pipeline runs against deterministic fakes in tests (see
//! [`crate::testing`]).

pub mod completer;
pub mod decoder;
pub mod ocr;

pub use completer::Completer;
pub use decoder::PdfDecoder;
pub use ocr::OcrEngine;
