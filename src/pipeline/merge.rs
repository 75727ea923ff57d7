//! Cross-chunk merge - collapse per-chunk results into one record.
//!
//! First-writer-wins by chunk index, with one exception: an explicit
//! redaction marker always beats a guessed value. Redaction is a positive
//! signal that the field is deliberately blacked out in the source
//! document; it must not be silently replaced by a lower-confidence guess
//! from another chunk, in either direction.

use tracing::debug;

use crate::types::chunk::RawChunkResult;
use crate::types::record::{is_sentinel, FieldCandidate, MergedRecord};

/// Merge chunk results in chunk-index order.
///
/// For each field path, the earliest chunk that supplied a non-empty,
/// non-sentinel value wins. A later `REDACTED` marker overrides an earlier
/// guessed value; an earlier `REDACTED` marker is never overridden. Fields
/// no chunk produced stay absent, for the normalizer's defaulting policy
/// to fill.
pub fn merge_results(results: &[RawChunkResult]) -> MergedRecord {
    let mut merged = MergedRecord::new();

    for result in results {
        if result.parse_failed {
            continue;
        }
        for (path, value) in &result.fields {
            if is_sentinel(value) {
                continue;
            }
            let candidate = FieldCandidate::new(value.clone(), result.chunk_index);

            match merged.get(path.as_str()) {
                None => {
                    merged.insert(path.clone(), candidate);
                }
                Some(existing) if candidate.redacted && !existing.redacted => {
                    debug!(
                        path = path.as_str(),
                        over_chunk = existing.chunk_index,
                        "redaction marker overrides earlier guess"
                    );
                    merged.insert(path.clone(), candidate);
                }
                Some(_) => {} // earlier writer (or earlier redaction) stands
            }
        }
    }

    merged
}
