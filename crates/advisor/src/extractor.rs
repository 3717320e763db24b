//! Structured profile extraction from free-text user messages.
//!
//! Wraps the provider facade's `extract_structured` capability and
//! deserializes the returned JSON object into a typed [`ProfileUpdate`].
//! Failures are a typed result — the engine decides to keep the prior
//! profile, this module never swallows anything itself.

use std::sync::Arc;

use gstmate_core::error::ExtractionError;
use gstmate_core::profile::ProfileUpdate;
use gstmate_core::provider::{ExtractionRequest, Provider};

use crate::prompts;

/// Infers profile fields from a user message via the language model.
pub struct ProfileExtractor {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
}

impl ProfileExtractor {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    /// Extract a partial profile update from `message`.
    ///
    /// Fields the model reports as null or omits deserialize to `None`;
    /// a reply that is not a profile-shaped JSON object is an
    /// [`ExtractionError::Unparseable`].
    pub async fn extract(&self, message: &str) -> Result<ProfileUpdate, ExtractionError> {
        let value = self
            .provider
            .extract_structured(ExtractionRequest {
                model: self.model.clone(),
                instruction: prompts::EXTRACTION_INSTRUCTION.into(),
                message: format!("Extract business information from this message: {message}"),
                temperature: self.temperature,
            })
            .await?;

        serde_json::from_value(value).map_err(|e| ExtractionError::Unparseable(e.to_string()))
    }
}
