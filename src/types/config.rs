//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for an extraction pipeline.
///
/// All policy constants the pipeline relies on live here rather than being
/// hard-coded, so deployments can tune them per document corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum trimmed length for native page text to be trusted.
    ///
    /// Below this, the page is assumed to be scanned-image-only (or to have
    /// a garbage text layer) and OCR is attempted. Default: 100.
    pub min_native_chars: usize,

    /// Minimum ratio of alphanumeric characters among non-whitespace
    /// characters for native text to be trusted.
    ///
    /// Guards against text layers that decode to glyph soup. Default: 0.4.
    pub min_alnum_ratio: f64,

    /// Maximum serialized prompt size in characters, schema instructions
    /// included.
    ///
    /// Documents whose text exceeds the remaining budget are split into
    /// multiple chunks. Default: 24_000.
    pub max_prompt_chars: usize,

    /// Response budget forwarded to the completion capability, in tokens.
    ///
    /// Default: 4096.
    pub response_budget: usize,

    /// Maximum concurrent external calls (OCR and completion).
    ///
    /// Kept small to respect provider rate limits. Default: 4.
    pub max_concurrency: usize,

    /// Timeout for one OCR invocation. A timed-out page falls back to its
    /// native text. Default: 30s.
    pub ocr_timeout: Duration,

    /// Timeout for one completion request. A timed-out chunk counts as one
    /// failed attempt. Default: 60s.
    pub completion_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_native_chars: 100,
            min_alnum_ratio: 0.4,
            max_prompt_chars: 24_000,
            response_budget: 4096,
            max_concurrency: 4,
            ocr_timeout: Duration::from_secs(30),
            completion_timeout: Duration::from_secs(60),
        }
    }
}

impl PipelineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the native-text trust threshold.
    pub fn with_min_native_chars(mut self, chars: usize) -> Self {
        self.min_native_chars = chars;
        self
    }

    /// Set the alphanumeric-ratio trust threshold.
    pub fn with_min_alnum_ratio(mut self, ratio: f64) -> Self {
        self.min_alnum_ratio = ratio;
        self
    }

    /// Set the prompt size budget.
    pub fn with_max_prompt_chars(mut self, chars: usize) -> Self {
        self.max_prompt_chars = chars;
        self
    }

    /// Set the completion response budget.
    pub fn with_response_budget(mut self, tokens: usize) -> Self {
        self.response_budget = tokens;
        self
    }

    /// Set the external-call concurrency limit.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    /// Set the OCR timeout.
    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout = timeout;
        self
    }

    /// Set the completion timeout.
    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }
}
