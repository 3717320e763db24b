//! Message and Conversation domain types.
//!
//! These are the core value objects that flow through the system:
//! a user sends a message → the advisor engine enriches it → the provider
//! generates a reply → both turns land in the session's conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session.
///
/// All three per-session stores (profile, document, conversation) are keyed
/// by this identifier independently — a conversation may exist without a
/// profile or document and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions (advisor directive, document grounding)
    System,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// A conversation is an ordered sequence of role-tagged turns for one session.
///
/// Invariants maintained by the methods below:
/// - Turn 0, if present, is always `Role::System`; it is replaced, not
///   appended, when updated.
/// - After trimming, length never exceeds the configured cap: the history is
///   rewritten to `[turn 0] + most recent (cap - 1)` turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// The session this conversation belongs to
    pub id: SessionId,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation with a fresh session id.
    pub fn new() -> Self {
        Self::for_session(SessionId::new())
    }

    /// Create a new empty conversation keyed to an existing session.
    pub fn for_session(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Install `content` as the leading system turn.
    ///
    /// Replaces turn 0 when it is already a system turn, otherwise inserts
    /// at position 0 so the directive always leads the history.
    pub fn install_system_turn(&mut self, content: impl Into<String>) {
        let message = Message::system(content);
        match self.messages.first() {
            Some(first) if first.role == Role::System => self.messages[0] = message,
            _ => self.messages.insert(0, message),
        }
        self.updated_at = Utc::now();
    }

    /// Enforce the history cap.
    ///
    /// Once length exceeds `max_turns`, the history is rewritten to
    /// `[turn 0] + most recent (max_turns - 1)` turns, preserving recency
    /// and the leading system turn.
    pub fn trim_to(&mut self, max_turns: usize) {
        if max_turns == 0 || self.messages.len() <= max_turns {
            return;
        }
        let tail_start = self.messages.len() - (max_turns - 1);
        let mut kept = Vec::with_capacity(max_turns);
        kept.push(self.messages[0].clone());
        kept.extend_from_slice(&self.messages[tail_start..]);
        self.messages = kept;
        self.updated_at = Utc::now();
    }

    /// Discard everything except the leading system turn.
    ///
    /// When turn 0 is missing or not a system turn, `default_directive` is
    /// synthesized in its place. The result is always a single system turn.
    pub fn reset_keeping_system(&mut self, default_directive: &str) {
        let system = match self.messages.first() {
            Some(first) if first.role == Role::System => first.clone(),
            _ => Message::system(default_directive),
        };
        self.messages = vec![system];
        self.updated_at = Utc::now();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
