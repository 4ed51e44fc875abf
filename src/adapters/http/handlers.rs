//! HTTP handlers for the conversation API.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::catalog::IntentRegistry;
use crate::domain::dialogue::DialogueEngine;
use crate::domain::foundation::SessionId;
use crate::ports::SessionStore;

use super::dto::{
    ChatRequest, ChatResponse, DeleteSessionResponse, ErrorResponse, HealthResponse,
    ReloadCatalogResponse, SessionResponse,
};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DialogueEngine>,
    pub registry: Arc<IntentRegistry>,
    pub store: Arc<dyn SessionStore>,
    /// Whether a real model API key is configured (health reporting).
    pub nlu_configured: bool,
    /// Whether a real search API key is configured (health reporting).
    pub search_configured: bool,
}

/// POST /api/chat - Run one conversation turn
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    if req.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Query cannot be empty")),
        )
            .into_response();
    }

    let session_id = match req.session_id.as_deref() {
        Some(raw) => match raw.parse::<SessionId>() {
            Ok(id) => Some(id),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::bad_request("Invalid session ID")),
                )
                    .into_response()
            }
        },
        None => None,
    };

    let outcome = state.engine.handle_turn(session_id, &req.query).await;
    (StatusCode::OK, Json(ChatResponse::from(outcome))).into_response()
}

/// GET /api/sessions/:id - Get session details
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let id = match session_id.parse::<SessionId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid session ID")),
            )
                .into_response()
        }
    };

    match state.store.get(id).await {
        Some(session) => {
            (StatusCode::OK, Json(SessionResponse::from(session))).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Session", &session_id)),
        )
            .into_response(),
    }
}

/// DELETE /api/sessions/:id - Delete a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let id = match session_id.parse::<SessionId>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request("Invalid session ID")),
            )
                .into_response()
        }
    };

    if state.store.delete(id).await {
        let response = DeleteSessionResponse {
            session_id,
            message: "Session deleted".to_string(),
        };
        (StatusCode::OK, Json(response)).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Session", &session_id)),
        )
            .into_response()
    }
}

/// POST /api/catalog/reload - Re-read the intent/entity catalog
///
/// A failed reload keeps the previous catalog live, so the error detail
/// is safe to return.
pub async fn reload_catalog(State(state): State<AppState>) -> Response {
    match state.registry.reload() {
        Ok(summary) => {
            (StatusCode::OK, Json(ReloadCatalogResponse::from(summary))).into_response()
        }
        Err(error) => {
            tracing::error!(%error, "catalog reload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(error.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /health - Service health
pub async fn health(State(state): State<AppState>) -> Response {
    let status = if state.nlu_configured && state.search_configured {
        "ok"
    } else {
        "degraded"
    };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status,
            nlu_configured: state.nlu_configured,
            search_configured: state.search_configured,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::nlu::MockNluProvider;
    use crate::adapters::search::MockSearchClient;
    use crate::adapters::store::InMemorySessionStore;
    use crate::config::CompletionPolicy;
    use crate::domain::catalog::{Catalog, QuestionSource};
    use crate::domain::dialogue::{EntityExtractor, RelevanceFilter};
    use crate::domain::retrieval::RetrievalOrchestrator;
    use std::time::Duration;

    const CATALOG_JSON: &str = r#"{
        "fallback_intent": "FAQ",
        "intents": {
            "FAQ": {
                "description": "general questions",
                "required_entities": ["question_topic"]
            }
        },
        "entities": {
            "question_topic": {"question_template": "What topic can I help you with?"}
        }
    }"#;

    fn state(nlu: MockNluProvider, search: MockSearchClient) -> AppState {
        let catalog = Catalog::from_json(CATALOG_JSON).unwrap();
        let registry = Arc::new(IntentRegistry::from_catalog(catalog, QuestionSource::Template));
        let store: Arc<InMemorySessionStore> =
            Arc::new(InMemorySessionStore::new(Duration::from_secs(3600)));
        let nlu = Arc::new(nlu);
        let search = Arc::new(search);
        let engine = Arc::new(DialogueEngine::new(
            registry.clone(),
            store.clone(),
            RelevanceFilter::new(),
            EntityExtractor::new(nlu.clone()),
            Arc::new(RetrievalOrchestrator::new(search, nlu, 10)),
            CompletionPolicy::Retain,
        ));
        AppState {
            engine,
            registry,
            store,
            nlu_configured: true,
            search_configured: true,
        }
    }

    fn default_state() -> AppState {
        state(MockNluProvider::new(), MockSearchClient::new())
    }

    #[tokio::test]
    async fn chat_rejects_empty_query() {
        let response = chat(
            State(default_state()),
            Json(ChatRequest {
                session_id: None,
                query: "   ".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_rejects_malformed_session_id() {
        let response = chat(
            State(default_state()),
            Json(ChatRequest {
                session_id: Some("not-a-uuid".to_string()),
                query: "tell me about insurance".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_runs_a_turn() {
        let nlu = MockNluProvider::new()
            .with_response(r#"{"intent": "FAQ", "entities": {}}"#);
        let response = chat(
            State(state(nlu, MockSearchClient::new())),
            Json(ChatRequest {
                session_id: None,
                query: "I have an insurance question".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_session_returns_404_for_unknown_id() {
        let response = get_session(
            State(default_state()),
            Path(SessionId::new().to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_session_returns_400_for_malformed_id() {
        let response = get_session(State(default_state()), Path("garbage".to_string())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_session_round_trip() {
        let state = default_state();
        let (id, _) = state.store.get_or_create(None).await;

        let deleted = delete_session(State(state.clone()), Path(id.to_string())).await;
        assert_eq!(deleted.status(), StatusCode::OK);

        let again = delete_session(State(state), Path(id.to_string())).await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reload_without_backing_file_is_a_server_error() {
        let response = reload_catalog(State(default_state())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_reports_degraded_without_keys() {
        let mut state = default_state();
        state.search_configured = false;
        let response = health(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
