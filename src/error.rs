//! Typed errors for the extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can abort an extraction run.
///
/// Per-page and per-chunk anomalies never appear here; they degrade the
/// result and are reported through the
/// [`ValidationReport`](crate::types::record::ValidationReport) instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No page in the document yielded any usable text.
    ///
    /// The only per-document fatal error. The HTTP layer maps this to
    /// "unable to extract text".
    #[error("document yielded no extractable text")]
    EmptyDocument,

    /// The schema definition is invalid (startup-time, never per-document)
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Pipeline configuration is unusable
    #[error("config error: {reason}")]
    Config { reason: String },

    /// Operation was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// Completion service failed (surfaced only by direct `Completer` use,
    /// never by `Extractor::extract`)
    #[error("completion service error: {0}")]
    Completion(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// OCR engine failed (surfaced only by direct `OcrEngine` use)
    #[error("OCR error: {0}")]
    Ocr(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// PDF decoding failed
    #[error("decode error: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Errors in the externally supplied schema document.
///
/// All of these are configuration failures: they surface when the schema is
/// loaded at process start, never while processing a document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema document is not valid JSON
    #[error("schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema file could not be read
    #[error("schema file unreadable: {0}")]
    Io(#[from] std::io::Error),

    /// Schema declares no fields
    #[error("schema declares no fields")]
    NoFields,

    /// Two field declarations share the same path
    #[error("duplicate field path: {path}")]
    DuplicatePath { path: String },

    /// A path is declared both as a leaf field and as a parent of another
    #[error("field path conflicts with a nested field: {path}")]
    PathConflict { path: String },

    /// A field declares an unsupported type name
    #[error("unknown field type {kind:?} for {path}")]
    UnknownType { path: String, kind: String },

    /// A category field declares no allowed values
    #[error("category field {path} declares no values")]
    EmptyCategory { path: String },

    /// A field path is empty or malformed
    #[error("invalid field path: {path:?}")]
    InvalidPath { path: String },
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Result type alias for schema loading.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
