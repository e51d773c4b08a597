//! Ollama Model Backend
//!
//! This module implements the TextGenerator trait against Ollama's
//! `/api/generate` endpoint. Ollama runs models locally on the user's
//! machine, typically at http://127.0.0.1:11434.
//!
//! Key behaviors:
//! - Non-streaming single-shot completions
//! - System text is folded into the prompt, separated by a blank line
//! - Per-call temperature via the request options object
//! - Missing `response` field in the reply decodes as an empty string

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{LLMError, Result, TextGenerator};

/// Ollama backend configuration
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Base URL for the Ollama API (typically http://127.0.0.1:11434)
    base_url: String,

    /// Model name to use (e.g., "qwen2.5-coder:7b")
    model: String,

    /// HTTP client for API requests
    client: Client,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Arguments
    /// * `base_url` - Base URL for the Ollama API
    /// * `model` - Model name to use
    /// * `timeout_secs` - Per-request timeout in seconds
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Fold the optional system text into the prompt.
    ///
    /// `/api/generate` takes a single prompt string, so the system text
    /// is prepended and separated from the task prompt by a blank line.
    fn build_prompt(prompt: &str, system: Option<&str>) -> String {
        match system {
            Some(system) => format!("{}\n\n{}", system, prompt),
            None => prompt.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        temperature: f32,
    ) -> Result<String> {
        let full_prompt = Self::build_prompt(prompt, system);

        tracing::debug!(
            "Ollama request: model={}, temperature={}, prompt_chars={}",
            self.model,
            temperature,
            full_prompt.len()
        );

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: full_prompt,
            stream: false,
            options: GenerateOptions { temperature },
        };

        let url = format!("{}/api/generate", self.base_url);
        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else if e.is_connect() {
                    LLMError::ProviderUnavailable(format!(
                        "Cannot connect to Ollama at {}. Is Ollama running?",
                        self.base_url
                    ))
                } else {
                    LLMError::NetworkError(e.to_string())
                }
            })?;

        tracing::info!(
            "Ollama response received in {:.1}s",
            start.elapsed().as_secs_f64()
        );

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::ProviderUnavailable(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(generate_response.response.trim().to_string())
    }

    async fn check_health(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Ollama `/api/generate` request format
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

/// Per-request sampling options
#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Ollama `/api/generate` response format
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_properties() {
        let client = OllamaClient::new("http://127.0.0.1:11434", "qwen2.5-coder:7b", 120);
        assert_eq!(client.name(), "ollama");
        assert_eq!(client.base_url, "http://127.0.0.1:11434");
        assert_eq!(client.model, "qwen2.5-coder:7b");
    }

    #[test]
    fn test_build_prompt_with_system() {
        let combined = OllamaClient::build_prompt("write a poem", Some("You are terse"));
        assert_eq!(combined, "You are terse\n\nwrite a poem");
    }

    #[test]
    fn test_build_prompt_without_system() {
        let combined = OllamaClient::build_prompt("write a poem", None);
        assert_eq!(combined, "write a poem");
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest {
            model: "qwen2.5-coder:7b".to_string(),
            prompt: "hello".to_string(),
            stream: false,
            options: GenerateOptions { temperature: 0.1 },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "qwen2.5-coder:7b");
        assert_eq!(json["prompt"], "hello");
        assert_eq!(json["stream"], false);
        assert!((json["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_response_missing_field_defaults_empty() {
        let decoded: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(decoded.response, "");

        let decoded: GenerateResponse =
            serde_json::from_str(r#"{"response": "  hi  "}"#).unwrap();
        assert_eq!(decoded.response, "  hi  ");
    }
}
