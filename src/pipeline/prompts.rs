//! Prompts for schema-driven extraction.
//!
//! Every chunk's prompt is self-contained: it repeats the full field
//! catalogue and the sentinel rules, so chunks can be completed in any
//! order and in isolation.

use sha2::{Digest, Sha256};

/// Prompt for extracting schema fields from one slice of document text.
pub const EXTRACT_PROMPT: &str = r#"You are an expert at extracting structured information from insurance policy documents.
Extract the fields listed below from the document text and return ONE JSON object.

Rules:
1. Keys are the exact dot-notation field paths listed below.
2. Use "UNKNOWN" as the value for a required field that is truly not present in this text; omit optional fields you cannot find.
3. If a field is blacked out, masked, or shows markers like ***, [REDACTED], or solid bars, use "REDACTED" as the value. Never guess a redacted value.
4. Monetary values and percentages are plain numbers, without currency symbols, commas, or % signs.
5. Dates are strings in DD/MM/YYYY format.
6. List fields are JSON arrays of strings.
7. The text may be OCR output with garbled characters. Read through the noise and search every section, including headers, footers, tables, and schedules.
8. Documents may be bilingual; extract values from whichever language they appear in.

Fields:
{schema}

Document text (page delimiters mark the printed pages):
---
{document}
---

Return ONLY the JSON object, no explanation."#;

/// Appended when the first response failed to parse as structured data.
pub const STRICT_RETRY_SUFFIX: &str = "\n\nYour previous reply was not parseable. Return only a single valid JSON object whose keys are the field paths. No prose, no markdown fences, no comments.";

/// Format the extraction prompt for one chunk.
pub fn format_extract_prompt(schema_description: &str, segment: &str) -> String {
    EXTRACT_PROMPT
        .replace("{schema}", schema_description)
        .replace("{document}", segment)
}

/// Serialized prompt size with an empty document slot, in bytes.
///
/// The chunker subtracts this from the prompt budget to get the text
/// budget per chunk.
pub fn prompt_overhead(schema_description: &str) -> usize {
    format_extract_prompt(schema_description, "").len()
}

/// Generate a hash of the extraction prompt template for cache invalidation.
pub fn extract_prompt_hash() -> String {
    let mut hasher = Sha256::new();
    hasher.update(EXTRACT_PROMPT.as_bytes());
    format!("{:x}", hasher.finalize())
}
