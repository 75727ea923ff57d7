//! Chunk orchestration - issue completion requests, parse, retry.
//!
//! One chunk never takes the run down with it: a malformed response is
//! retried once with a stricter instruction, and a chunk that stays
//! malformed is recorded as fully missing. Partial extraction beats total
//! failure.

use futures::future::join_all;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::pipeline::prompts::STRICT_RETRY_SUFFIX;
use crate::traits::completer::Completer;
use crate::types::chunk::{ExtractionChunk, RawChunkResult};
use crate::types::config::PipelineConfig;

/// Run all chunks against the completion capability.
///
/// Requests run concurrently under the shared semaphore; results come back
/// keyed and sorted by chunk index, so arrival order never affects the
/// merge.
pub async fn run_chunks<C: Completer>(
    chunks: &[ExtractionChunk],
    completer: &C,
    config: &PipelineConfig,
    semaphore: Arc<Semaphore>,
) -> Vec<RawChunkResult> {
    let futures = chunks.iter().map(|chunk| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = semaphore.acquire().await.expect("semaphore never closed");
            run_chunk(chunk, completer, config).await
        }
    });

    let mut results: Vec<RawChunkResult> = join_all(futures).await;
    results.sort_by_key(|r| r.chunk_index);
    results
}

/// Run one chunk: complete, parse, retry once on a malformed response.
async fn run_chunk<C: Completer>(
    chunk: &ExtractionChunk,
    completer: &C,
    config: &PipelineConfig,
) -> RawChunkResult {
    if let Some(fields) = attempt(chunk, &chunk.prompt, completer, config).await {
        debug!(chunk = chunk.index, fields = fields.len(), "chunk parsed");
        return RawChunkResult::parsed(chunk.index, fields, 1);
    }

    let strict_prompt = format!("{}{}", chunk.prompt, STRICT_RETRY_SUFFIX);
    if let Some(fields) = attempt(chunk, &strict_prompt, completer, config).await {
        debug!(chunk = chunk.index, fields = fields.len(), "chunk parsed on retry");
        return RawChunkResult::parsed(chunk.index, fields, 2);
    }

    warn!(chunk = chunk.index, "chunk unparsable after retry, recording as missing");
    RawChunkResult::missing(chunk.index, 2)
}

/// One completion attempt. Transport errors, timeouts, and unparsable
/// responses all count as a failed attempt.
async fn attempt<C: Completer>(
    chunk: &ExtractionChunk,
    prompt: &str,
    completer: &C,
    config: &PipelineConfig,
) -> Option<IndexMap<String, Value>> {
    let response = match timeout(
        config.completion_timeout,
        completer.complete(prompt, config.response_budget),
    )
    .await
    {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!(chunk = chunk.index, error = %e, "completion failed");
            return None;
        }
        Err(_) => {
            warn!(chunk = chunk.index, "completion timed out");
            return None;
        }
    };

    parse_response(&response)
}

/// Parse a completion response into a flat field-path -> value map.
///
/// Accepts a bare JSON object, a fenced ```json block, or an object
/// embedded in surrounding prose. Nested objects are flattened to
/// dot-notation paths; arrays stay as values.
pub fn parse_response(raw: &str) -> Option<IndexMap<String, Value>> {
    let candidate = extract_json_object(raw)?;
    let value: Value = serde_json::from_str(candidate).ok()?;
    let map = value.as_object()?;

    let mut fields = IndexMap::new();
    for (key, val) in map {
        flatten_into(key, val, &mut fields);
    }
    Some(fields)
}

/// Locate the JSON object inside a possibly decorated response.
fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }

    // Fenced code block, with or without a language tag.
    if let Some(fence_start) = trimmed.find("```") {
        let after = &trimmed[fence_start + 3..];
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
        if let Some(fence_end) = after[body_start..].find("```") {
            let body = after[body_start..body_start + fence_end].trim();
            if body.starts_with('{') && body.ends_with('}') {
                return Some(body);
            }
        }
    }

    // Outermost braces inside prose.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

/// Flatten nested objects into dot-notation field paths.
fn flatten_into(prefix: &str, value: &Value, out: &mut IndexMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten_into(&format!("{}.{}", prefix, key), val, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCompleter;
    use serde_json::json;

    fn chunk(index: usize, prompt: &str) -> ExtractionChunk {
        ExtractionChunk {
            index,
            segment: String::new(),
            range: 0..0,
            prompt: prompt.to_string(),
        }
    }

    #[test]
    fn test_parse_bare_object() {
        let fields = parse_response(r#"{"policyholder.name": "John Doe"}"#).unwrap();
        assert_eq!(fields["policyholder.name"], json!("John Doe"));
    }

    #[test]
    fn test_parse_fenced_object() {
        let raw = "Here you go:\n```json\n{\"vehicle.chassisNumber\": \"KMHXX00XXXX\"}\n```";
        let fields = parse_response(raw).unwrap();
        assert_eq!(fields["vehicle.chassisNumber"], json!("KMHXX00XXXX"));
    }

    #[test]
    fn test_parse_object_in_prose() {
        let raw = "The extracted data is {\"a\": 1} as requested.";
        let fields = parse_response(raw).unwrap();
        assert_eq!(fields["a"], json!(1));
    }

    #[test]
    fn test_nested_objects_flatten_to_paths() {
        let raw = r#"{"vehicle": {"chassisNumber": "ABC", "yearOfManufacture": 2019}}"#;
        let fields = parse_response(raw).unwrap();
        assert_eq!(fields["vehicle.chassisNumber"], json!("ABC"));
        assert_eq!(fields["vehicle.yearOfManufacture"], json!(2019));
    }

    #[test]
    fn test_arrays_stay_as_values() {
        let raw = r#"{"policyholder.namedDrivers": ["A Driver", "B Driver"]}"#;
        let fields = parse_response(raw).unwrap();
        assert_eq!(
            fields["policyholder.namedDrivers"],
            json!(["A Driver", "B Driver"])
        );
    }

    #[test]
    fn test_prose_without_json_is_unparsable() {
        assert!(parse_response("I could not find any fields.").is_none());
        assert!(parse_response("[1, 2, 3]").is_none());
        assert!(parse_response("").is_none());
    }

    #[tokio::test]
    async fn test_clean_response_takes_one_attempt() {
        let completer = MockCompleter::new().with_response(r#"{"a": "1"}"#);
        let config = PipelineConfig::default();
        let semaphore = Arc::new(Semaphore::new(1));

        let results = run_chunks(&[chunk(0, "p")], &completer, &config, semaphore).await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].parse_failed);
        assert_eq!(results[0].attempts, 1);
        assert_eq!(completer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_then_valid_uses_retry() {
        let completer = MockCompleter::new()
            .with_response("Sorry, here is the data in prose form.")
            .with_response(r#"{"insurer.name": "Acme Insurance Ltd"}"#);
        let config = PipelineConfig::default();
        let semaphore = Arc::new(Semaphore::new(1));

        let results = run_chunks(&[chunk(0, "p")], &completer, &config, semaphore).await;

        assert!(!results[0].parse_failed);
        assert_eq!(results[0].attempts, 2);
        assert_eq!(results[0].fields["insurer.name"], json!("Acme Insurance Ltd"));

        // The retry prompt carries the strict instruction.
        let calls = completer.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].ends_with(STRICT_RETRY_SUFFIX));
    }

    #[tokio::test]
    async fn test_twice_malformed_marks_chunk_missing() {
        let completer = MockCompleter::new()
            .with_response("not json")
            .with_response("still not json");
        let config = PipelineConfig::default();
        let semaphore = Arc::new(Semaphore::new(1));

        let results = run_chunks(&[chunk(0, "p")], &completer, &config, semaphore).await;

        assert!(results[0].parse_failed);
        assert!(results[0].fields.is_empty());
        assert_eq!(results[0].attempts, 2);
    }

    #[tokio::test]
    async fn test_transport_error_counts_as_failed_attempt() {
        let completer = MockCompleter::new()
            .fail_next()
            .with_response(r#"{"a": 1}"#);
        let config = PipelineConfig::default();
        let semaphore = Arc::new(Semaphore::new(1));

        let results = run_chunks(&[chunk(0, "p")], &completer, &config, semaphore).await;

        assert!(!results[0].parse_failed);
        assert_eq!(results[0].attempts, 2);
    }

    #[tokio::test]
    async fn test_results_ordered_by_chunk_index() {
        let completer = MockCompleter::new().with_default(r#"{"a": 1}"#);
        let config = PipelineConfig::default();
        let semaphore = Arc::new(Semaphore::new(4));

        let chunks: Vec<_> = (0..5).map(|i| chunk(i, "p")).collect();
        let results = run_chunks(&chunks, &completer, &config, semaphore).await;

        let indices: Vec<_> = results.iter().map(|r| r.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }
}
