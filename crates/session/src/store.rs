//! The session store — three independent per-session maps and the
//! conversation-manager operations over them.
//!
//! The maps are keyed by session id with no referential integrity between
//! them: a conversation may exist without a profile or document and vice
//! versa. Each mutation is atomic under its map's `RwLock`; mutating entry
//! points additionally serialize per session via [`SessionStore::session_guard`]
//! so two concurrent chat turns for the same session cannot interleave
//! their read-modify-write sequences. Different sessions never contend.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use gstmate_core::message::{Conversation, Message, SessionId};
use gstmate_core::profile::{BusinessProfile, ProfileUpdate};

/// In-memory session state: profiles, documents, and conversations.
pub struct SessionStore {
    max_history_turns: usize,
    profiles: RwLock<HashMap<String, BusinessProfile>>,
    documents: RwLock<HashMap<String, String>>,
    conversations: RwLock<HashMap<String, Conversation>>,
    guards: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionStore {
    /// Create a store enforcing the given conversation cap.
    pub fn new(max_history_turns: usize) -> Self {
        Self {
            max_history_turns,
            profiles: RwLock::new(HashMap::new()),
            documents: RwLock::new(HashMap::new()),
            conversations: RwLock::new(HashMap::new()),
            guards: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the per-session guard serializing mutating operations.
    ///
    /// Held for the duration of a chat turn, upload, reset, or profile
    /// update. Guards are created on first touch and kept for the process
    /// lifetime, matching the stores themselves.
    pub async fn session_guard(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut guards = self.guards.lock().await;
            guards
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    // ── Profiles ──────────────────────────────────────────────────────────

    /// Idempotently create a default (all-fields-unset) profile.
    pub async fn ensure_profile(&self, session_id: &str) {
        self.profiles
            .write()
            .await
            .entry(session_id.to_string())
            .or_default();
    }

    /// The stored profile, if any. Absence is distinct from an empty profile.
    pub async fn profile(&self, session_id: &str) -> Option<BusinessProfile> {
        self.profiles.read().await.get(session_id).cloned()
    }

    /// Fold a partial update into the session's profile, creating the
    /// default profile first when absent. Returns the merged result.
    pub async fn merge_profile(
        &self,
        session_id: &str,
        update: ProfileUpdate,
    ) -> BusinessProfile {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.entry(session_id.to_string()).or_default();
        profile.merge(update);
        profile.clone()
    }

    // ── Documents ─────────────────────────────────────────────────────────

    /// Store document text for the session, replacing any prior blob.
    pub async fn set_document(&self, session_id: &str, text: impl Into<String>) {
        self.documents
            .write()
            .await
            .insert(session_id.to_string(), text.into());
    }

    /// The stored document text, if any.
    pub async fn document(&self, session_id: &str) -> Option<String> {
        self.documents.read().await.get(session_id).cloned()
    }

    // ── Conversations ─────────────────────────────────────────────────────

    /// Idempotently create a history containing the single fixed system
    /// directive turn.
    pub async fn ensure_conversation(&self, session_id: &str, directive: &str) {
        let mut conversations = self.conversations.write().await;
        conversations.entry(session_id.to_string()).or_insert_with(|| {
            let mut conv = Conversation::for_session(SessionId::from(session_id));
            conv.push(Message::system(directive));
            conv
        });
    }

    /// Install `content` as the conversation's leading system turn,
    /// creating the conversation when absent.
    pub async fn install_system_turn(&self, session_id: &str, content: &str) {
        let mut conversations = self.conversations.write().await;
        let conv = conversations
            .entry(session_id.to_string())
            .or_insert_with(|| Conversation::for_session(SessionId::from(session_id)));
        conv.install_system_turn(content);
    }

    /// Append the raw user turn.
    pub async fn append_user(&self, session_id: &str, content: &str) {
        let mut conversations = self.conversations.write().await;
        let conv = conversations
            .entry(session_id.to_string())
            .or_insert_with(|| Conversation::for_session(SessionId::from(session_id)));
        conv.push(Message::user(content));
    }

    /// Append the assistant reply, then enforce the history cap.
    pub async fn append_assistant(&self, session_id: &str, content: &str) {
        let mut conversations = self.conversations.write().await;
        let conv = conversations
            .entry(session_id.to_string())
            .or_insert_with(|| Conversation::for_session(SessionId::from(session_id)));
        conv.push(Message::assistant(content));
        conv.trim_to(self.max_history_turns);
    }

    /// The stored conversation, if any.
    pub async fn conversation(&self, session_id: &str) -> Option<Conversation> {
        self.conversations.read().await.get(session_id).cloned()
    }

    /// Reset the session's conversation while preserving its profile.
    ///
    /// Keeps the existing system turn (or synthesizes `default_directive`
    /// when turn 0 is missing or not a system turn), discards all other
    /// turns, and deletes any stored document text. The business profile is
    /// deliberately untouched.
    pub async fn reset(&self, session_id: &str, default_directive: &str) {
        {
            let mut conversations = self.conversations.write().await;
            if let Some(conv) = conversations.get_mut(session_id) {
                conv.reset_keeping_system(default_directive);
            }
        }
        self.documents.write().await.remove(session_id);
    }
}
