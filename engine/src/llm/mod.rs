//! Model Backend Abstraction Layer
//!
//! This module provides the interface for text generation against a locally
//! hosted model server. The `TextGenerator` trait defines the contract the
//! planner, summarizer, chat handler, and pipeline all program against,
//! keeping them independent of the concrete HTTP client (and mockable in
//! tests).

use async_trait::async_trait;

pub mod ollama;
pub mod prompts;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during model operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Text generation backend trait
///
/// A single blocking-style completion call: the caller supplies the task
/// prompt, an optional system text that frames it, and the sampling
/// temperature for this call. Implementations return the generated text
/// with surrounding whitespace trimmed.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the name of the backend (e.g., "ollama")
    fn name(&self) -> &str;

    /// Generate a completion for the given prompt
    ///
    /// # Arguments
    /// * `prompt` - The task prompt
    /// * `system` - Optional system text prepended to the prompt
    /// * `temperature` - Sampling temperature for this call
    ///
    /// # Returns
    /// * `Ok(String)` - The generated text, trimmed
    /// * `Err(LLMError)` - If the request fails
    async fn generate(&self, prompt: &str, system: Option<&str>, temperature: f32)
        -> Result<String>;

    /// Check if the backend is currently reachable.
    /// Default implementation returns true.
    async fn check_health(&self) -> bool {
        true
    }
}
