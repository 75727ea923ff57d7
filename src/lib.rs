//! Insurance Policy Extraction Library
//!
//! Turns an insurance policy PDF into a validated structured record. The
//! pipeline resolves per-page text (embedded text layer with an OCR
//! fallback for scanned pages), assembles a page-delimited document,
//! chunks it under a prompt budget, asks a completion model to extract
//! the fields a [`RecordSchema`] declares, merges the per-chunk answers,
//! and normalizes the result against the schema.
//!
//! # Design Philosophy
//!
//! - Capability-driven: PDF decoding, OCR, and completions are injected
//!   behind traits, so the core carries no provider lock-in and tests run
//!   against deterministic fakes
//! - Degrade, don't fail: a garbled page, an unresponsive OCR engine, or
//!   a malformed completion lowers the [`ValidationReport`], it never
//!   aborts the run - the only fatal input is a document with no text at
//!   all
//! - Schema as data: the target record shape is a JSON document loaded at
//!   startup, not a compiled-in type
//!
//! # Usage
//!
//! ```rust,ignore
//! use policy_extract::{Extractor, RecordSchema};
//! use policy_extract::ai::OpenAiCompleter;
//!
//! let schema = RecordSchema::from_path("motor_policy.json")?;
//! let completer = OpenAiCompleter::from_env()?;
//! let extractor = Extractor::new(decoder, ocr, completer, schema)?;
//!
//! let record = extractor.extract(&pdf_bytes).await?;
//! println!("{}", serde_json::to_string_pretty(&record.fields)?);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capability abstractions (PdfDecoder, OcrEngine, Completer)
//! - [`types`] - Domain data types
//! - [`schema`] - Record schema loading and validation
//! - [`pipeline`] - The extraction pipeline and its stages
//! - [`testing`] - Mock capabilities for tests

pub mod error;
pub mod pipeline;
pub mod schema;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{ExtractError, Result, SchemaError, SchemaResult};
pub use schema::{FieldType, RecordSchema, SchemaField};
pub use traits::{Completer, OcrEngine, PdfDecoder};
pub use types::{
    chunk::{ExtractionChunk, RawChunkResult},
    config::PipelineConfig,
    document::{DocumentText, PageSpan},
    page::{AcquisitionMethod, DecodedPage, PageImage, ResolvedPage},
    record::{
        FieldCandidate, FieldError, MergedRecord, PageProvenance, ValidatedRecord,
        ValidationReport, REDACTED, UNKNOWN,
    },
};

// Re-export Extractor from pipeline
pub use pipeline::Extractor;

// Re-export pipeline components for callers that drive stages directly
pub use pipeline::{
    assemble::assemble,
    chunker::chunk_document,
    merge::merge_results,
    normalize::normalize,
    orchestrate::{parse_response, run_chunks},
    prompts::{extract_prompt_hash, format_extract_prompt, STRICT_RETRY_SUFFIX},
    resolve::{native_text_trusted, resolve_pages},
};
