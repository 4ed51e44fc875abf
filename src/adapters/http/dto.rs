//! HTTP DTOs for the conversation API.
//!
//! These types decouple the HTTP API from domain types, allowing
//! independent evolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogSummary;
use crate::domain::dialogue::{ChatMessage, MessageRole, Session, Stage, TurnOutcome, TurnStatus};
use crate::ports::SearchHit;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One conversation turn.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Session to continue; omit to start a new conversation.
    #[serde(default)]
    pub session_id: Option<String>,
    /// The user's utterance.
    pub query: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Result of one conversation turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
    pub requires_input: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<String>,
    pub collected_entities: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchResultDto>>,
    pub status: TurnStatus,
}

impl From<TurnOutcome> for ChatResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            session_id: outcome.session_id.to_string(),
            response: outcome.response,
            requires_input: outcome.requires_input,
            next_question: outcome.next_question,
            collected_entities: outcome.collected,
            search_results: outcome
                .results
                .map(|hits| hits.into_iter().map(Into::into).collect()),
            status: outcome.status,
        }
    }
}

/// One search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultDto {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub snippets: Vec<String>,
}

impl From<SearchHit> for SearchResultDto {
    fn from(hit: SearchHit) -> Self {
        Self {
            title: hit.title,
            description: hit.description,
            url: hit.url,
            snippets: hit.snippets,
        }
    }
}

/// One transcript message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDto {
    pub role: String,
    pub content: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchResultDto>>,
}

impl From<ChatMessage> for MessageDto {
    fn from(message: ChatMessage) -> Self {
        Self {
            role: match message.role {
                MessageRole::User => "user".to_string(),
                MessageRole::Assistant => "assistant".to_string(),
            },
            content: message.content,
            timestamp: message.timestamp.as_datetime().to_rfc3339(),
            search_results: message
                .search_results
                .map(|hits| hits.into_iter().map(Into::into).collect()),
        }
    }
}

/// Detailed session view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub collected_entities: HashMap<String, String>,
    pub history: Vec<MessageDto>,
    pub created_at: String,
    pub last_activity: String,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id.to_string(),
            stage: session.stage,
            intent: session.intent,
            collected_entities: session.collected,
            history: session.history.into_iter().map(Into::into).collect(),
            created_at: session.created_at.as_datetime().to_rfc3339(),
            last_activity: session.last_activity.as_datetime().to_rfc3339(),
        }
    }
}

/// Response for session deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteSessionResponse {
    pub session_id: String,
    pub message: String,
}

/// Identifier lists after a catalog reload.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadCatalogResponse {
    pub intents: Vec<String>,
    pub entities: Vec<String>,
}

impl From<CatalogSummary> for ReloadCatalogResponse {
    fn from(summary: CatalogSummary) -> Self {
        Self {
            intents: summary.intents,
            entities: summary.entities,
        }
    }
}

/// Service health report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub nlu_configured: bool,
    pub search_configured: bool,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} '{}' not found", resource, id),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}
