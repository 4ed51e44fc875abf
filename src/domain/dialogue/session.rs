//! Conversation session aggregate.
//!
//! A session is the state of one conversation across turns: the adopted
//! intent, the entities collected so far, the transcript, and the current
//! stage. Sessions are memory-resident and expire after inactivity.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, Timestamp};
use crate::ports::SearchHit;

use super::stage::Stage;

/// Who produced a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// One message in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent this message.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
    /// When the message was recorded.
    pub timestamp: Timestamp,
    /// Search results delivered with this message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchHit>>,
}

impl ChatMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Timestamp::now(),
            search_results: None,
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Timestamp::now(),
            search_results: None,
        }
    }

    /// Creates an assistant message carrying search results.
    pub fn assistant_with_results(content: impl Into<String>, results: Vec<SearchHit>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Timestamp::now(),
            search_results: Some(results),
        }
    }
}

/// A proposed reuse of collected entities after an intent switch, waiting
/// for the user's answer.
///
/// Exists only while the session stage is `Confirming`; the next turn
/// clears it whatever the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    /// The intent the user appears to have switched to.
    pub candidate_intent: String,
    /// Entities from the old intent that the new one can use, in the new
    /// intent's collection order.
    pub reusable: Vec<(String, String)>,
    /// The confirmation question shown to the user.
    pub prompt: String,
}

/// The state of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session identifier.
    pub id: SessionId,
    /// When the session was created.
    pub created_at: Timestamp,
    /// Last time a turn touched this session.
    pub last_activity: Timestamp,
    /// The adopted intent, once one is known.
    pub intent: Option<String>,
    /// Collected entity values, keyed by entity id.
    pub collected: HashMap<String, String>,
    /// Ordered conversation transcript.
    pub history: Vec<ChatMessage>,
    /// Current lifecycle stage.
    pub stage: Stage,
    /// Outstanding entity-reuse confirmation, if any.
    pub pending: Option<PendingConfirmation>,
}

impl Session {
    /// Creates a fresh session.
    pub fn new(id: SessionId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            created_at: now,
            last_activity: now,
            intent: None,
            collected: HashMap::new(),
            history: Vec::new(),
            stage: Stage::Initial,
            pending: None,
        }
    }

    /// Refreshes the activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Timestamp::now();
    }

    /// Returns true when the session has been idle longer than `ttl`.
    pub fn is_expired(&self, ttl: Duration, now: &Timestamp) -> bool {
        now.duration_since(&self.last_activity).num_seconds() > ttl.as_secs() as i64
    }

    /// Appends a user message to the transcript.
    pub fn record_user(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::user(content));
    }

    /// Appends an assistant message to the transcript.
    pub fn record_assistant(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::assistant(content));
    }

    /// Appends an assistant message carrying search results.
    pub fn record_answer(&mut self, content: impl Into<String>, results: Vec<SearchHit>) {
        self.history
            .push(ChatMessage::assistant_with_results(content, results));
    }

    /// The first user utterance, used as the default retrieval query.
    pub fn first_user_utterance(&self) -> Option<&str> {
        self.history
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }

    /// Stores an entity value; repeated entities keep the latest value.
    pub fn insert_entity(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.collected.insert(id.into(), value.into());
    }

    /// Forgets all collected entities.
    pub fn clear_entities(&mut self) {
        self.collected.clear();
    }

    /// Adopts an intent for this conversation.
    pub fn adopt_intent(&mut self, intent: impl Into<String>) {
        self.intent = Some(intent.into());
    }

    /// The last `limit` transcript messages as (role, text) pairs for
    /// prompt context.
    pub fn recent_history(&self, limit: usize) -> Vec<(String, String)> {
        let skip = self.history.len().saturating_sub(limit);
        self.history[skip..]
            .iter()
            .map(|m| {
                let role = match m.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                };
                (role.to_string(), m.content.clone())
            })
            .collect()
    }
}
