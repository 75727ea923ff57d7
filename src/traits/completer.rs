//! Generative completion capability.

use async_trait::async_trait;

use crate::error::Result;

/// Generative text completion.
///
/// Implementations wrap an LLM provider (OpenAI, Anthropic, a local model).
/// The pipeline sends fully self-contained prompts and expects a JSON
/// object back, but a malformed response is handled locally with a retry,
/// never propagated as a run failure.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Complete a prompt, bounding the response to roughly
    /// `response_budget` tokens.
    async fn complete(&self, prompt: &str, response_budget: usize) -> Result<String>;
}
