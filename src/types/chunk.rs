//! Chunk types - bounded slices of document text and their raw results.

use indexmap::IndexMap;
use serde_json::Value;

/// One bounded-size slice of document text, packaged with the
/// schema-instruction prompt for a single completion request.
///
/// Invariant: concatenating the `segment`s of all chunks in index order
/// reconstructs the document text exactly.
#[derive(Debug, Clone)]
pub struct ExtractionChunk {
    /// 0-based chunk index, in document order
    pub index: usize,

    /// The slice of document text carried by this chunk
    pub segment: String,

    /// Byte offset range of `segment` within the document text
    pub range: std::ops::Range<usize>,

    /// The fully serialized prompt (instructions + schema + segment)
    pub prompt: String,
}

/// The raw, untyped outcome of one chunk's completion request.
#[derive(Debug, Clone, Default)]
pub struct RawChunkResult {
    /// Index of the chunk this result belongs to
    pub chunk_index: usize,

    /// Flat field-path -> value map parsed from the response.
    ///
    /// Empty when the response never parsed.
    pub fields: IndexMap<String, Value>,

    /// True when both the first attempt and the strict retry failed to
    /// parse; the chunk contributes nothing to the merge.
    pub parse_failed: bool,

    /// Completion attempts consumed (1 or 2)
    pub attempts: u8,
}

impl RawChunkResult {
    /// A successfully parsed result.
    pub fn parsed(chunk_index: usize, fields: IndexMap<String, Value>, attempts: u8) -> Self {
        Self {
            chunk_index,
            fields,
            parse_failed: false,
            attempts,
        }
    }

    /// A fully missing result: the chunk's output could not be parsed.
    pub fn missing(chunk_index: usize, attempts: u8) -> Self {
        Self {
            chunk_index,
            fields: IndexMap::new(),
            parse_failed: true,
            attempts,
        }
    }
}
