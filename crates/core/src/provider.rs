//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider knows how to send a conversation to an LLM and get a response
//! back. The advisor engine calls `complete()` and `extract_structured()`
//! without knowing which provider is being used — pure polymorphism.
//!
//! Implementations: OpenAI-compatible endpoints (Groq, OpenAI, Ollama, vLLM),
//! plus stub providers in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// Configuration for a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "llama-3.3-70b-versatile")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A structured-extraction request: a fixed instruction applied to one
/// free-text message, expecting a single JSON object back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// The model to use
    pub model: String,

    /// The extraction instruction (sent as the system turn)
    pub instruction: String,

    /// The free-text message to extract from
    pub message: String,

    /// Temperature for the extraction call
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// The core Provider trait.
///
/// Both capabilities are black boxes to the caller: no retry, streaming,
/// or timeout logic lives above this trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "groq", "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Ask the model to produce a single JSON object.
    ///
    /// Default implementation: one completion call (instruction as the
    /// system turn, message as the user turn) followed by lenient JSON
    /// parsing that tolerates markdown code fences around the object.
    async fn extract_structured(
        &self,
        request: ExtractionRequest,
    ) -> std::result::Result<serde_json::Value, ProviderError> {
        let response = self
            .complete(ProviderRequest {
                model: request.model,
                messages: vec![
                    Message::system(&request.instruction),
                    Message::user(&request.message),
                ],
                temperature: request.temperature,
                max_tokens: None,
            })
            .await?;

        parse_json_object(&response.message.content).ok_or_else(|| {
            ProviderError::InvalidResponse(format!(
                "expected a JSON object, got: {}",
                truncate_for_log(&response.message.content)
            ))
        })
    }

    /// List available models for this provider.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

/// Extract a JSON object from model output.
///
/// Tries a direct parse first, then the span between the first `{` and the
/// last `}` — which also handles ```json fences and prose around the object.
pub fn parse_json_object(text: &str) -> Option<serde_json::Value> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(&trimmed[start..=end])
        .ok()
        .filter(|value| value.is_object())
}

fn truncate_for_log(text: &str) -> String {
    const MAX: usize = 200;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(MAX).collect();
        format!("{prefix}…")
    }
}
