//! The externally supplied record schema.
//!
//! The target record shape (field paths, types, required flags) is
//! configuration, not logic: it is loaded once at process start into an
//! immutable [`RecordSchema`] and passed explicitly into the pipeline.
//! A malformed schema is a startup-time [`SchemaError`], never a
//! per-document one.
//!
//! Document format:
//!
//! ```json
//! {
//!   "fields": [
//!     { "path": "policyholder.name", "type": "string", "required": true },
//!     { "path": "vehicle.yearOfManufacture", "type": "integer", "required": true },
//!     { "path": "coverage.typeOfCover", "type": "category",
//!       "values": ["comprehensive", "third party"], "required": true },
//!     { "path": "policyholder.namedDrivers", "type": "sequence", "required": false }
//!   ]
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::{SchemaError, SchemaResult};

/// Declared type of one schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Free-form text
    String,

    /// Floating-point number (monetary amounts, percentages)
    Number,

    /// Whole number (years, seat counts)
    Integer,

    /// One of an enumerated set of values, matched case-insensitively
    Category(Vec<String>),

    /// Ordered list of strings
    Sequence,

    /// Free-form nested mapping
    Object,
}

impl FieldType {
    /// The type name as written in schema documents.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Category(_) => "category",
            FieldType::Sequence => "sequence",
            FieldType::Object => "object",
        }
    }
}

/// One declared field.
#[derive(Debug, Clone)]
pub struct SchemaField {
    /// Dot-notation path (e.g. `vehicle.chassisNumber`)
    pub path: String,

    /// Declared type
    pub kind: FieldType,

    /// Whether the source document is expected to contain this field
    pub required: bool,

    /// Optional human-readable hint, embedded in prompts
    pub description: Option<String>,
}

/// The immutable, validated field catalogue for the target record.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    fields: Vec<SchemaField>,
    fingerprint: String,
}

#[derive(Deserialize)]
struct RawSchema {
    fields: Vec<RawField>,
}

#[derive(Deserialize)]
struct RawField {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    values: Vec<String>,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(default)]
    description: Option<String>,
}

fn default_required() -> bool {
    true
}

impl RecordSchema {
    /// Load a schema from an already-parsed JSON document.
    pub fn from_value(value: Value) -> SchemaResult<Self> {
        let raw: RawSchema = serde_json::from_value(value)?;
        Self::build(raw)
    }

    /// Load a schema from a JSON string.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let raw: RawSchema = serde_json::from_str(json)?;
        Self::build(raw)
    }

    /// Load a schema from a file.
    pub fn from_path(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn build(raw: RawSchema) -> SchemaResult<Self> {
        if raw.fields.is_empty() {
            return Err(SchemaError::NoFields);
        }

        let mut fields = Vec::with_capacity(raw.fields.len());
        for f in raw.fields {
            if f.path.trim().is_empty() || f.path.split('.').any(|seg| seg.trim().is_empty()) {
                return Err(SchemaError::InvalidPath { path: f.path });
            }

            let kind = match f.kind.as_str() {
                "string" => FieldType::String,
                "number" => FieldType::Number,
                "integer" => FieldType::Integer,
                "sequence" => FieldType::Sequence,
                "object" => FieldType::Object,
                "category" => {
                    if f.values.is_empty() {
                        return Err(SchemaError::EmptyCategory { path: f.path });
                    }
                    FieldType::Category(f.values)
                }
                other => {
                    return Err(SchemaError::UnknownType {
                        path: f.path,
                        kind: other.to_string(),
                    })
                }
            };

            fields.push(SchemaField {
                path: f.path,
                kind,
                required: f.required,
                description: f.description,
            });
        }

        for (i, field) in fields.iter().enumerate() {
            for other in &fields[i + 1..] {
                if field.path == other.path {
                    return Err(SchemaError::DuplicatePath {
                        path: field.path.clone(),
                    });
                }
            }
            // A leaf path may not also be the parent of another leaf.
            let prefix = format!("{}.", field.path);
            if fields.iter().any(|o| o.path.starts_with(&prefix)) {
                return Err(SchemaError::PathConflict {
                    path: field.path.clone(),
                });
            }
        }

        let description = render_description(&fields);
        let fingerprint = {
            let mut hasher = Sha256::new();
            hasher.update(description.as_bytes());
            format!("{:x}", hasher.finalize())
        };

        Ok(Self {
            fields,
            fingerprint,
        })
    }

    /// The declared fields, in declaration order.
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Look up one field by path.
    pub fn get(&self, path: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields (never true after load).
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render the field catalogue for embedding into prompts.
    pub fn describe(&self) -> String {
        render_description(&self.fields)
    }

    /// SHA-256 fingerprint of the rendered catalogue, for cache
    /// invalidation when the schema changes.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn render_description(fields: &[SchemaField]) -> String {
    let mut out = String::new();
    for field in fields {
        let requiredness = if field.required { "required" } else { "optional" };
        match &field.kind {
            FieldType::Category(values) => {
                out.push_str(&format!(
                    "- {} (category, {}; one of: {})",
                    field.path,
                    requiredness,
                    values.join(", ")
                ));
            }
            kind => {
                out.push_str(&format!("- {} ({}, {})", field.path, kind.name(), requiredness));
            }
        }
        if let Some(desc) = &field.description {
            out.push_str(&format!(": {}", desc));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_schema() -> Value {
        json!({
            "fields": [
                { "path": "policyholder.name", "type": "string", "required": true },
                { "path": "vehicle.yearOfManufacture", "type": "integer", "required": true },
                { "path": "coverage.typeOfCover", "type": "category",
                  "values": ["comprehensive", "third party"], "required": true },
                { "path": "policyholder.namedDrivers", "type": "sequence", "required": false }
            ]
        })
    }

    #[test]
    fn test_load_valid_schema() {
        let schema = RecordSchema::from_value(minimal_schema()).unwrap();
        assert_eq!(schema.len(), 4);
        assert_eq!(
            schema.get("vehicle.yearOfManufacture").unwrap().kind,
            FieldType::Integer
        );
        assert!(!schema.get("policyholder.namedDrivers").unwrap().required);
    }

    #[test]
    fn test_required_defaults_to_true() {
        let schema = RecordSchema::from_value(json!({
            "fields": [{ "path": "insurer.name", "type": "string" }]
        }))
        .unwrap();
        assert!(schema.get("insurer.name").unwrap().required);
    }

    #[test]
    fn test_empty_schema_rejected() {
        let err = RecordSchema::from_value(json!({ "fields": [] })).unwrap_err();
        assert!(matches!(err, SchemaError::NoFields));
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let err = RecordSchema::from_value(json!({
            "fields": [
                { "path": "a.b", "type": "string" },
                { "path": "a.b", "type": "number" }
            ]
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicatePath { .. }));
    }

    #[test]
    fn test_leaf_parent_conflict_rejected() {
        let err = RecordSchema::from_value(json!({
            "fields": [
                { "path": "coverage", "type": "string" },
                { "path": "coverage.typeOfCover", "type": "string" }
            ]
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::PathConflict { .. }));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = RecordSchema::from_value(json!({
            "fields": [{ "path": "a", "type": "decimal" }]
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn test_category_without_values_rejected() {
        let err = RecordSchema::from_value(json!({
            "fields": [{ "path": "a", "type": "category" }]
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::EmptyCategory { .. }));
    }

    #[test]
    fn test_describe_lists_every_field() {
        let schema = RecordSchema::from_value(minimal_schema()).unwrap();
        let description = schema.describe();
        for field in schema.fields() {
            assert!(description.contains(&field.path));
        }
        assert!(description.contains("one of: comprehensive, third party"));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = RecordSchema::from_value(minimal_schema()).unwrap();
        let b = RecordSchema::from_value(minimal_schema()).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64); // SHA-256 hex
    }
}
