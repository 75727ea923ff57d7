//! Schema normalization - coerce the merged record into schema shape.
//!
//! This stage never raises for data-shape problems. Every anomaly becomes
//! a sentinel plus a report entry, and the caller decides how to react.
//! The only fatal failure in this area is a malformed schema definition,
//! which surfaces at load time in [`crate::schema`], never here.

use serde_json::{Map, Number, Value};

use crate::schema::{FieldType, RecordSchema, SchemaField};
use crate::types::record::{FieldError, MergedRecord, ValidationReport, REDACTED};

/// Validate and coerce the merged record against the schema.
///
/// Returns the schema-shaped record (every declared field present, with
/// the sentinel `null` standing in for anything never populated) and the
/// validation report.
pub fn normalize(merged: &MergedRecord, schema: &RecordSchema) -> (Value, ValidationReport) {
    let mut record = Value::Object(Map::new());
    let mut errors = Vec::new();
    let mut missing = Vec::new();

    for field in schema.fields() {
        let normalized = match merged.get(&field.path) {
            None => {
                missing.push(field.path.clone());
                Value::Null
            }
            Some(candidate) if candidate.redacted => {
                // Redaction is a positive signal, kept verbatim for any
                // declared type. Not an error, not missing.
                Value::String(REDACTED.to_string())
            }
            Some(candidate) => match coerce(&candidate.value, field) {
                Ok(value) => value,
                Err(reason) => {
                    errors.push(FieldError::new(&field.path, reason));
                    Value::Null
                }
            },
        };
        set_path(&mut record, &field.path, normalized);
    }

    (record, ValidationReport::new(errors, missing))
}

/// Coerce one candidate value to its declared type.
fn coerce(value: &Value, field: &SchemaField) -> Result<Value, String> {
    match &field.kind {
        FieldType::String => coerce_string(value),
        FieldType::Number => coerce_number(value),
        FieldType::Integer => coerce_integer(value),
        FieldType::Category(allowed) => coerce_category(value, allowed),
        FieldType::Sequence => coerce_sequence(value),
        FieldType::Object => match value {
            Value::Object(_) => Ok(value.clone()),
            other => Err(format!("expected an object, got {}", type_name(other))),
        },
    }
}

fn coerce_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(s) => Ok(Value::String(s.trim().to_string())),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(format!("expected a string, got {}", type_name(other))),
    }
}

fn coerce_number(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) => {
            let cleaned = clean_numeric(s);
            cleaned
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("{:?} is not numeric", s))
        }
        other => Err(format!("expected a number, got {}", type_name(other))),
    }
}

fn coerce_integer(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::Number(i.into()));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 => Ok(Value::Number((f as i64).into())),
                _ => Err(format!("{} is not a whole number", n)),
            }
        }
        Value::String(s) => {
            let cleaned = clean_numeric(s);
            if let Ok(i) = cleaned.parse::<i64>() {
                return Ok(Value::Number(i.into()));
            }
            match cleaned.parse::<f64>() {
                Ok(f) if f.fract() == 0.0 => Ok(Value::Number((f as i64).into())),
                _ => Err(format!("{:?} is not a whole number", s)),
            }
        }
        other => Err(format!("expected an integer, got {}", type_name(other))),
    }
}

fn coerce_category(value: &Value, allowed: &[String]) -> Result<Value, String> {
    let text = match value {
        Value::String(s) => s.trim(),
        other => return Err(format!("expected a category string, got {}", type_name(other))),
    };

    allowed
        .iter()
        .find(|v| v.eq_ignore_ascii_case(text))
        .map(|v| Value::String(v.clone()))
        .ok_or_else(|| format!("{:?} is not one of: {}", text, allowed.join(", ")))
}

fn coerce_sequence(value: &Value) -> Result<Value, String> {
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match coerce_string(item) {
                    Ok(Value::String(s)) if !s.is_empty() => out.push(Value::String(s)),
                    Ok(_) => {}
                    Err(_) => return Err("sequence items must be scalar".to_string()),
                }
            }
            Ok(Value::Array(out))
        }
        // Models frequently emit lists as comma-separated strings.
        Value::String(s) => Ok(Value::Array(
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| Value::String(part.to_string()))
                .collect(),
        )),
        other => Err(format!("expected a sequence, got {}", type_name(other))),
    }
}

/// Strip currency decoration the model sometimes leaves on amounts.
fn clean_numeric(s: &str) -> String {
    s.replace("HKD", "")
        .replace('$', "")
        .replace(',', "")
        .replace('%', "")
        .trim()
        .to_string()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Set a dot-notation path inside a JSON object, creating parents.
fn set_path(record: &mut Value, path: &str, value: Value) {
    let mut current = record;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let map = current
            .as_object_mut()
            .expect("parents are always objects by construction");
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}
