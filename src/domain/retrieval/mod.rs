//! Retrieval and answer synthesis.
//!
//! Once every required entity is collected, this module turns the session
//! into a search query, calls the search provider, and produces the final
//! response text: a synthesized paragraph for narrative intents, a
//! count-plus-profile line for list intents.

mod query;
mod synthesis;

pub use query::build_query;
pub use synthesis::{fallback_summary, profile_summary, synthesis_prompt, SUMMARY_HITS};

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::catalog::{AnswerFormat, IntentDefinition};
use crate::ports::{NluProvider, NluRequest, SearchError, SearchHit, SearchProvider};

/// Upper bound on hits kept from the search service.
pub const MAX_HITS: usize = 10;

/// A completed retrieval: response text plus the raw hits.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalAnswer {
    /// Response text shown to the user.
    pub summary: String,
    /// Truncated search hits backing the response.
    pub hits: Vec<SearchHit>,
}

/// Runs search and synthesis for a finished collection.
pub struct RetrievalOrchestrator {
    search: Arc<dyn SearchProvider>,
    nlu: Arc<dyn NluProvider>,
    max_results: usize,
}

impl RetrievalOrchestrator {
    /// Creates an orchestrator over the given providers.
    pub fn new(
        search: Arc<dyn SearchProvider>,
        nlu: Arc<dyn NluProvider>,
        max_results: usize,
    ) -> Self {
        Self {
            search,
            nlu,
            max_results: max_results.min(MAX_HITS),
        }
    }

    /// Builds the query, searches, and produces the answer text.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when the search service fails; collected
    /// entities are untouched so the caller can retry. Summarization
    /// failures do not error: the raw excerpts are returned instead.
    pub async fn run(
        &self,
        intent: &IntentDefinition,
        first_utterance: Option<&str>,
        collected: &HashMap<String, String>,
    ) -> Result<RetrievalAnswer, SearchError> {
        let query = build_query(intent, first_utterance, collected);
        tracing::debug!(intent = %intent.id, %query, "running retrieval");

        let mut hits = self.search.search(&query, self.max_results).await?;
        hits.truncate(MAX_HITS);

        let summary = match intent.answer_format {
            AnswerFormat::Narrative => self.synthesize(intent, &hits).await,
            AnswerFormat::List => profile_summary(intent, collected, hits.len()),
        };

        Ok(RetrievalAnswer { summary, hits })
    }

    async fn synthesize(&self, intent: &IntentDefinition, hits: &[SearchHit]) -> String {
        if hits.is_empty() {
            return "I couldn't find anything on that. Could you rephrase your question?"
                .to_string();
        }

        let request = NluRequest::new(synthesis_prompt(intent, hits))
            .with_temperature(0.4)
            .with_max_output_tokens(1024);

        match self.nlu.complete(request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => fallback_summary(hits),
            Err(error) => {
                tracing::warn!(intent = %intent.id, %error, "summarization failed, returning raw excerpts");
                fallback_summary(hits)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NluError;
    use async_trait::async_trait;

    struct FixedSearch(Result<Vec<SearchHit>, ()>);

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
            match &self.0 {
                Ok(hits) => Ok(hits.iter().take(limit).cloned().collect()),
                Err(()) => Err(SearchError::unavailable("down")),
            }
        }
    }

    struct FixedNlu(Result<String, ()>);

    #[async_trait]
    impl NluProvider for FixedNlu {
        async fn complete(&self, _request: NluRequest) -> Result<String, NluError> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(NluError::unavailable("down")),
            }
        }
    }

    fn hits(n: usize) -> Vec<SearchHit> {
        (0..n)
            .map(|i| SearchHit::new(format!("T{}", i), format!("D{}", i), "https://u"))
            .collect()
    }

    fn list_intent() -> IntentDefinition {
        IntentDefinition {
            id: "PlanInfo".to_string(),
            description: String::new(),
            required_entities: Vec::new(),
            optional_entities: Vec::new(),
            hint_keywords: Vec::new(),
            search_qualifiers: vec!["age".to_string()],
            answer_format: AnswerFormat::List,
            query_template: None,
            summary_instruction: None,
        }
    }

    fn narrative_intent() -> IntentDefinition {
        IntentDefinition {
            answer_format: AnswerFormat::Narrative,
            ..list_intent()
        }
    }

    #[tokio::test]
    async fn list_intent_gets_profile_summary_and_hits() {
        let orchestrator = RetrievalOrchestrator::new(
            Arc::new(FixedSearch(Ok(hits(3)))),
            Arc::new(FixedNlu(Ok("unused".to_string()))),
            10,
        );
        let mut collected = HashMap::new();
        collected.insert("age".to_string(), "43".to_string());

        let answer = orchestrator
            .run(&list_intent(), Some("best plans"), &collected)
            .await
            .unwrap();

        assert_eq!(answer.hits.len(), 3);
        assert!(answer.summary.contains("Age: 43"));
        assert!(answer.summary.contains("3 options"));
    }

    #[tokio::test]
    async fn narrative_intent_uses_model_summary() {
        let orchestrator = RetrievalOrchestrator::new(
            Arc::new(FixedSearch(Ok(hits(2)))),
            Arc::new(FixedNlu(Ok("A synthesized answer.".to_string()))),
            10,
        );

        let answer = orchestrator
            .run(&narrative_intent(), Some("what is an hmo"), &HashMap::new())
            .await
            .unwrap();

        assert_eq!(answer.summary, "A synthesized answer.");
        assert_eq!(answer.hits.len(), 2);
    }

    #[tokio::test]
    async fn summarization_failure_falls_back_to_excerpts() {
        let orchestrator = RetrievalOrchestrator::new(
            Arc::new(FixedSearch(Ok(hits(2)))),
            Arc::new(FixedNlu(Err(()))),
            10,
        );

        let answer = orchestrator
            .run(&narrative_intent(), Some("what is an hmo"), &HashMap::new())
            .await
            .unwrap();

        assert!(answer.summary.starts_with("Here's what I found:"));
        assert!(answer.summary.contains("- T0: D0"));
    }

    #[tokio::test]
    async fn search_failure_propagates() {
        let orchestrator = RetrievalOrchestrator::new(
            Arc::new(FixedSearch(Err(()))),
            Arc::new(FixedNlu(Ok("unused".to_string()))),
            10,
        );

        let result = orchestrator
            .run(&list_intent(), Some("best plans"), &HashMap::new())
            .await;
        assert!(matches!(result, Err(SearchError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn empty_narrative_results_get_a_gentle_reply() {
        let orchestrator = RetrievalOrchestrator::new(
            Arc::new(FixedSearch(Ok(vec![]))),
            Arc::new(FixedNlu(Ok("unused".to_string()))),
            10,
        );

        let answer = orchestrator
            .run(&narrative_intent(), Some("what is an hmo"), &HashMap::new())
            .await
            .unwrap();

        assert!(answer.summary.contains("couldn't find"));
        assert!(answer.hits.is_empty());
    }
}
