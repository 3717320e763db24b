//! The advisor engine — one chat turn, end to end.
//!
//! Turn order (matching the service contract):
//! 1. Ensure a default profile exists, then run structured extraction and
//!    merge any result. Extraction failure is logged and the stored profile
//!    is kept — it never fails the turn.
//! 2. Assemble the enriched input from the raw message, current profile,
//!    and (truncated) document text.
//! 3. Ensure the conversation exists and append the raw user turn.
//! 4. Send the fixed tax-knowledge system prompt plus the enriched input to
//!    the provider. A completion failure is terminal for this turn only —
//!    the appended user turn stays so the next turn can retry.
//! 5. Append the reply and enforce the history cap.

use std::sync::Arc;

use gstmate_config::AppConfig;
use gstmate_core::error::Result;
use gstmate_core::message::Message;
use gstmate_core::provider::{Provider, ProviderRequest};
use gstmate_session::SessionStore;
use tracing::{debug, warn};

use crate::context::ContextAssembler;
use crate::extractor::ProfileExtractor;
use crate::prompts;

/// Orchestrates chat turns against a provider and a session store.
pub struct AdvisorEngine {
    provider: Arc<dyn Provider>,
    extractor: ProfileExtractor,
    assembler: ContextAssembler,
    store: Arc<SessionStore>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AdvisorEngine {
    pub fn new(provider: Arc<dyn Provider>, store: Arc<SessionStore>, config: &AppConfig) -> Self {
        let extractor = ProfileExtractor::new(
            provider.clone(),
            &config.default_model,
            config.default_temperature,
        );
        Self {
            provider,
            extractor,
            assembler: ContextAssembler::new(config.session.document_context_chars),
            store,
            model: config.default_model.clone(),
            temperature: config.default_temperature,
            max_tokens: config.default_max_tokens,
        }
    }

    /// The session store this engine operates on.
    pub fn store(&self) -> Arc<SessionStore> {
        self.store.clone()
    }

    /// Run one chat turn for `session_id` and return the model's reply.
    pub async fn chat(&self, session_id: &str, message: &str) -> Result<String> {
        let _guard = self.store.session_guard(session_id).await;

        self.store.ensure_profile(session_id).await;
        match self.extractor.extract(message).await {
            Ok(update) => {
                self.store.merge_profile(session_id, update).await;
            }
            Err(e) => {
                warn!(session = %session_id, error = %e,
                    "profile extraction failed, keeping stored profile");
            }
        }

        let profile = self.store.profile(session_id).await.unwrap_or_default();
        let document = self.store.document(session_id).await;
        let enriched = self
            .assembler
            .build(message, &profile, document.as_deref());

        self.store
            .ensure_conversation(session_id, prompts::SYSTEM_DIRECTIVE)
            .await;
        self.store.append_user(session_id, message).await;

        debug!(session = %session_id, enriched_len = enriched.len(), "Sending chat completion");
        let response = self
            .provider
            .complete(ProviderRequest {
                model: self.model.clone(),
                messages: vec![
                    Message::system(prompts::TAX_KNOWLEDGE_PROMPT),
                    Message::user(&enriched),
                ],
                temperature: self.temperature,
                max_tokens: Some(self.max_tokens),
            })
            .await?;

        let reply = response.message.content;
        self.store.append_assistant(session_id, &reply).await;

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gstmate_core::error::{Error, ProviderError};
    use gstmate_core::message::Role;
    use gstmate_core::provider::ProviderResponse;
    use tokio::sync::Mutex;

    /// Scripted provider: answers extraction requests with `extraction_reply`,
    /// chat requests with `chat_reply`, and records every request it sees.
    struct ScriptedProvider {
        extraction_reply: String,
        chat_reply: std::result::Result<String, ProviderError>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl ScriptedProvider {
        fn new(extraction_reply: &str, chat_reply: &str) -> Self {
            Self {
                extraction_reply: extraction_reply.into(),
                chat_reply: Ok(chat_reply.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing_chat(extraction_reply: &str) -> Self {
            Self {
                extraction_reply: extraction_reply.into(),
                chat_reply: Err(ProviderError::Network("connection refused".into())),
                requests: Mutex::new(Vec::new()),
            }
        }

        async fn chat_requests(&self) -> Vec<ProviderRequest> {
            self.requests
                .lock()
                .await
                .iter()
                .filter(|r| r.messages[0].content == prompts::TAX_KNOWLEDGE_PROMPT)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            self.requests.lock().await.push(request.clone());
            let is_extraction = request.messages[0].content == prompts::EXTRACTION_INSTRUCTION;
            let content = if is_extraction {
                self.extraction_reply.clone()
            } else {
                self.chat_reply.clone()?
            };
            Ok(ProviderResponse {
                message: Message::assistant(content),
                usage: None,
                model: request.model,
            })
        }
    }

    fn engine_with(provider: ScriptedProvider) -> (AdvisorEngine, Arc<ScriptedProvider>) {
        let provider = Arc::new(provider);
        let config = AppConfig::default();
        let store = Arc::new(SessionStore::new(config.session.max_history_turns));
        (
            AdvisorEngine::new(provider.clone(), store, &config),
            provider,
        )
    }

    #[tokio::test]
    async fn chat_turn_appends_raw_user_and_assistant() {
        let (engine, _) = engine_with(ScriptedProvider::new("{}", "Here is your answer."));

        let reply = engine.chat("s1", "When is GSTR-3B due?").await.unwrap();
        assert_eq!(reply, "Here is your answer.");

        let conv = engine.store().conversation("s1").await.unwrap();
        assert_eq!(conv.len(), 3);
        assert_eq!(conv.messages[0].role, Role::System);
        // The stored user turn is the raw message, not the enriched input.
        assert_eq!(conv.messages[1].content, "When is GSTR-3B due?");
        assert_eq!(conv.messages[2].content, "Here is your answer.");
    }

    #[tokio::test]
    async fn extraction_result_merged_into_profile() {
        let (engine, _) = engine_with(ScriptedProvider::new(
            r#"{"business_type": "LLC", "compliance_concerns": ["late filing"]}"#,
            "ok",
        ));

        engine.chat("s1", "I run an LLC").await.unwrap();
        let profile = engine.store().profile("s1").await.unwrap();
        assert_eq!(profile.business_type.as_deref(), Some("LLC"));
        assert_eq!(profile.compliance_concerns, vec!["late filing"]);
    }

    #[tokio::test]
    async fn extraction_failure_never_fails_the_turn() {
        let (engine, _) = engine_with(ScriptedProvider::new(
            "I could not find any business details.",
            "still answered",
        ));

        let reply = engine.chat("s1", "hello").await.unwrap();
        assert_eq!(reply, "still answered");
        // A default profile exists even though extraction produced nothing.
        let profile = engine.store().profile("s1").await.unwrap();
        assert!(profile.business_type.is_none());
    }

    #[tokio::test]
    async fn enriched_input_carries_profile_and_document_prefix() {
        let (engine, provider) = engine_with(ScriptedProvider::new(
            r#"{"industry": "textiles"}"#,
            "ok",
        ));
        engine.store().set_document("s1", "quarterly report body").await;

        engine.chat("s1", "What applies to me?").await.unwrap();

        let chats = provider.chat_requests().await;
        assert_eq!(chats.len(), 1);
        let enriched = &chats[0].messages[1].content;
        assert!(enriched.contains("User question: What applies to me?"));
        assert!(enriched.contains("- Industry: textiles"));
        assert!(enriched.contains("Relevant document content: quarterly report body"));
    }

    #[tokio::test]
    async fn document_prefix_is_bounded_in_facade_input() {
        let (engine, provider) = engine_with(ScriptedProvider::new("{}", "ok"));
        let long_doc = "x".repeat(9000);
        engine.store().set_document("s1", &long_doc).await;

        engine.chat("s1", "summarize").await.unwrap();

        let chats = provider.chat_requests().await;
        let enriched = &chats[0].messages[1].content;
        assert!(enriched.contains(&"x".repeat(5000)));
        assert!(!enriched.contains(&"x".repeat(5001)));
    }

    #[tokio::test]
    async fn completion_failure_is_terminal_but_keeps_history() {
        let (engine, _) = engine_with(ScriptedProvider::failing_chat("{}"));

        let err = engine.chat("s1", "question").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));

        let conv = engine.store().conversation("s1").await.unwrap();
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages[1].role, Role::User);
    }

    #[tokio::test]
    async fn scalar_fields_reflect_most_recent_extraction() {
        let (engine, _) = engine_with(ScriptedProvider::new(
            r#"{"revenue_range": "20-50 lakhs"}"#,
            "ok",
        ));
        engine
            .store()
            .merge_profile(
                "s1",
                gstmate_core::profile::ProfileUpdate {
                    revenue_range: Some("under 20 lakhs".into()),
                    ..Default::default()
                },
            )
            .await;

        engine.chat("s1", "revenue grew this year").await.unwrap();
        let profile = engine.store().profile("s1").await.unwrap();
        assert_eq!(profile.revenue_range.as_deref(), Some("20-50 lakhs"));
    }
}
