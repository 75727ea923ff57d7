//! Record types - merged candidates, the validated record, and its report.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::page::AcquisitionMethod;

/// The reserved marker for a field that is deliberately blacked out in the
/// source document.
pub const REDACTED: &str = "REDACTED";

/// The reserved marker models emit for a field they could not find.
///
/// Treated as a sentinel: it never claims a field during merge and
/// normalizes to `null` plus a `missing_fields` entry.
pub const UNKNOWN: &str = "UNKNOWN";

/// One surviving candidate value for a field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCandidate {
    /// The candidate value as the model produced it
    pub value: Value,

    /// Index of the chunk that supplied the value
    pub chunk_index: usize,

    /// True when the value is an explicit redaction marker
    pub redacted: bool,
}

impl FieldCandidate {
    /// Create a candidate from a chunk's output.
    pub fn new(value: Value, chunk_index: usize) -> Self {
        let redacted = is_redacted(&value);
        Self {
            value,
            chunk_index,
            redacted,
        }
    }
}

/// Field-path -> winning candidate, after merging all chunk results.
///
/// Exactly one candidate survives per path: the one from the earliest chunk
/// that supplied a non-empty, non-sentinel value, unless an explicit
/// redaction marker overrides it.
pub type MergedRecord = IndexMap<String, FieldCandidate>;

/// A single validation problem on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dot-notation field path (e.g. `vehicle.chassisNumber`)
    pub path: String,

    /// Human-readable reason the value was rejected
    pub reason: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Structured summary of schema-conformance problems found in one run.
///
/// Produced fresh per run and never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only when no errors occurred and every declared field was
    /// populated
    pub is_valid: bool,

    /// Field-level coercion and conformance errors
    pub errors: Vec<FieldError>,

    /// Declared field paths never populated by any chunk
    pub missing_fields: Vec<String>,
}

impl ValidationReport {
    /// Build a report, deriving `is_valid` from its contents.
    pub fn new(errors: Vec<FieldError>, missing_fields: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty() && missing_fields.is_empty(),
            errors,
            missing_fields,
        }
    }

    /// A report for a fully conformant record.
    pub fn valid() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

/// Per-page acquisition provenance carried on the final record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageProvenance {
    /// 0-based page index
    pub page_index: usize,

    /// How the page's text was acquired
    pub method: AcquisitionMethod,

    /// Whether the page contributed any text
    pub populated: bool,
}

/// The externally visible result of one extraction run.
///
/// Every schema-declared field is present in [`Self::fields`], with the
/// sentinel `null` standing in for anything never populated. Ownership
/// passes to the caller on return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedRecord {
    /// Unique id of the extraction run
    pub run_id: Uuid,

    /// Schema-shaped record with every declared field present
    pub fields: Value,

    /// Validation outcome for this record
    pub report: ValidationReport,

    /// Acquisition provenance, one entry per page in page order
    pub pages: Vec<PageProvenance>,

    /// When the run completed
    pub completed_at: DateTime<Utc>,
}

/// Whether a value is a sentinel that must never claim a field.
///
/// Sentinels: JSON `null`, empty or whitespace-only strings, and
/// `UNKNOWN`-prefixed strings (the model's "not found" filler). Redaction
/// markers are NOT sentinels; they carry positive signal.
pub fn is_sentinel(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed.to_uppercase().starts_with(UNKNOWN)
        }
        _ => false,
    }
}

/// Whether a value is an explicit redaction marker.
///
/// Matches `REDACTED` and `REDACTED - ...` style strings, case-insensitively.
pub fn is_redacted(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().to_uppercase().starts_with(REDACTED),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinel_detection() {
        assert!(is_sentinel(&Value::Null));
        assert!(is_sentinel(&json!("")));
        assert!(is_sentinel(&json!("   ")));
        assert!(is_sentinel(&json!("UNKNOWN")));
        assert!(is_sentinel(&json!("unknown - standard usage applies")));

        assert!(!is_sentinel(&json!("John Doe")));
        assert!(!is_sentinel(&json!(0)));
        assert!(!is_sentinel(&json!("REDACTED")));
    }

    #[test]
    fn test_redaction_detection() {
        assert!(is_redacted(&json!("REDACTED")));
        assert!(is_redacted(&json!(" redacted ")));
        assert!(is_redacted(&json!("REDACTED - blacked out in source")));

        assert!(!is_redacted(&json!("UNKNOWN")));
        assert!(!is_redacted(&json!(42)));
        assert!(!is_redacted(&Value::Null));
    }

    #[test]
    fn test_report_validity_derivation() {
        assert!(ValidationReport::valid().is_valid);
        assert!(!ValidationReport::new(vec![], vec!["vehicle.chassisNumber".into()]).is_valid);
        assert!(
            !ValidationReport::new(vec![FieldError::new("a", "not a number")], vec![]).is_valid
        );
    }
}
