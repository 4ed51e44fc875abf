//! Per-turn dialogue engine.
//!
//! The state machine at the center of the service. Each turn it decides
//! whether to reject the utterance, ask for more information, confirm
//! entity reuse after an intent switch, or run retrieval, using the
//! relevance filter, the extractor, the catalog registry, and the session
//! store.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::CompletionPolicy;
use crate::domain::catalog::{Catalog, IntentRegistry, QuestionContext};
use crate::domain::foundation::{SessionId, StateMachine};
use crate::domain::retrieval::RetrievalOrchestrator;
use crate::ports::{SearchHit, SessionStore};

use super::acknowledgment::acknowledgment_for;
use super::carryover::{parse_confirmation, plan_intent_switch, ConfirmationReply, SwitchPlan};
use super::extraction::{EntityExtractor, ExtractionContext, ExtractionResult};
use super::relevance::RelevanceFilter;
use super::session::Session;
use super::stage::Stage;

/// Reply for utterances the relevance filter screens out.
const REJECTION_MESSAGE: &str = "I can help with health insurance plans, coverage, \
providers, and costs. Could you ask me something in that area?";

/// Reply when the extraction call fails; entities are untouched.
const EXTRACTION_FAILURE_MESSAGE: &str = "I'm having trouble understanding right now. \
Could you send that again in a moment? Everything you've told me so far is saved.";

/// Client-facing classification of a turn's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// The utterance was off-topic and not processed.
    Rejected,
    /// More information is needed; a question was asked.
    Collecting,
    /// An entity-reuse confirmation is waiting for an answer.
    Confirming,
    /// Retrieval ran and results were delivered.
    Complete,
    /// An upstream call failed; the user can retry.
    Error,
}

/// Everything one turn produces.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The session this turn belongs to (freshly allocated when the
    /// request carried no usable id).
    pub session_id: SessionId,
    /// Full response text.
    pub response: String,
    /// Whether the conversation needs another user turn.
    pub requires_input: bool,
    /// The question asked, when one was.
    pub next_question: Option<String>,
    /// Entities collected so far.
    pub collected: HashMap<String, String>,
    /// Search results, when retrieval completed.
    pub results: Option<Vec<SearchHit>>,
    /// Outcome classification.
    pub status: TurnStatus,
}

/// The dialogue engine.
pub struct DialogueEngine {
    registry: Arc<IntentRegistry>,
    store: Arc<dyn SessionStore>,
    filter: RelevanceFilter,
    extractor: EntityExtractor,
    retrieval: Arc<RetrievalOrchestrator>,
    completion_policy: CompletionPolicy,
}

impl DialogueEngine {
    /// Wires the engine to its collaborators.
    pub fn new(
        registry: Arc<IntentRegistry>,
        store: Arc<dyn SessionStore>,
        filter: RelevanceFilter,
        extractor: EntityExtractor,
        retrieval: Arc<RetrievalOrchestrator>,
        completion_policy: CompletionPolicy,
    ) -> Self {
        Self {
            registry,
            store,
            filter,
            extractor,
            retrieval,
            completion_policy,
        }
    }

    /// Processes one user turn.
    ///
    /// The session handle's lock is held for the whole turn, so turns
    /// against the same session serialize. Upstream failures produce an
    /// `Error` outcome with collected entities intact rather than a hard
    /// failure.
    pub async fn handle_turn(
        &self,
        session_id: Option<SessionId>,
        utterance: &str,
    ) -> TurnOutcome {
        let (id, handle) = self.store.get_or_create(session_id).await;
        let mut guard = handle.lock().await;
        let session = &mut *guard;

        session.record_user(utterance);
        let catalog = self.registry.snapshot();

        let skip_extraction = self.resolve_pending_confirmation(session, utterance);

        if session.stage.screens_input() && !self.filter.is_on_topic(utterance) {
            let outcome = TurnOutcome {
                session_id: id,
                response: REJECTION_MESSAGE.to_string(),
                requires_input: true,
                next_question: None,
                collected: session.collected.clone(),
                results: None,
                status: TurnStatus::Rejected,
            };
            return finish(session, outcome);
        }

        let extraction = if skip_extraction {
            ExtractionResult {
                intent: session
                    .intent
                    .clone()
                    .unwrap_or_else(|| catalog.fallback_intent().to_string()),
                entities: Vec::new(),
            }
        } else {
            let awaiting = awaiting_entity(&catalog, session);
            let ctx = ExtractionContext {
                catalog: &catalog,
                current_intent: session.intent.as_deref(),
                collected: &session.collected,
                awaiting_entity: awaiting.as_deref(),
            };
            match self.extractor.extract(utterance, &ctx).await {
                Ok(result) => result,
                Err(error) => {
                    tracing::warn!(session = %id, %error, "extraction failed");
                    let outcome = TurnOutcome {
                        session_id: id,
                        response: EXTRACTION_FAILURE_MESSAGE.to_string(),
                        requires_input: true,
                        next_question: None,
                        collected: session.collected.clone(),
                        results: None,
                        status: TurnStatus::Error,
                    };
                    return finish(session, outcome);
                }
            }
        };

        if let Some(outcome) = self.resolve_intent(session, id, &catalog, &extraction.intent) {
            return outcome;
        }

        let mut last_filled: Option<(String, String)> = None;
        for (key, value) in &extraction.entities {
            session.insert_entity(key.clone(), value.clone());
            last_filled = Some((key.clone(), value.clone()));
        }

        let intent_id = session
            .intent
            .clone()
            .unwrap_or_else(|| catalog.fallback_intent().to_string());

        let missing: Vec<String> = catalog
            .required_entities(&intent_id)
            .into_iter()
            .filter(|e| session.collected.get(e).map_or(true, |v| v.is_empty()))
            .collect();

        if !missing.is_empty() {
            advance(session, Stage::Collecting);

            let acknowledgment = last_filled.and_then(|(key, value)| {
                catalog
                    .entity(&key)
                    .map(|entity| acknowledgment_for(entity, &value, session.collected.len()))
            });

            let recent = session.recent_history(6);
            let ctx = QuestionContext {
                intent: Some(&intent_id),
                collected: &session.collected,
                recent_history: &recent,
            };
            let question = self.registry.question_for(&missing[0], &ctx).await;

            let response = match acknowledgment {
                Some(ack) => format!("{}\n\n{}", ack, question),
                None => question.clone(),
            };

            let outcome = TurnOutcome {
                session_id: id,
                response,
                requires_input: true,
                next_question: Some(question),
                collected: session.collected.clone(),
                results: None,
                status: TurnStatus::Collecting,
            };
            return finish(session, outcome);
        }

        let Some(intent_def) = catalog.intent(&intent_id) else {
            // A reload removed the intent mid-conversation.
            tracing::warn!(session = %id, intent = %intent_id, "intent no longer in catalog");
            session.clear_entities();
            session.intent = None;
            session.stage = Stage::Initial;
            let outcome = TurnOutcome {
                session_id: id,
                response: "Let's start over. What would you like to know about health \
insurance plans?"
                    .to_string(),
                requires_input: true,
                next_question: None,
                collected: HashMap::new(),
                results: None,
                status: TurnStatus::Error,
            };
            return finish(session, outcome);
        };

        advance(session, Stage::Searching);
        let first_utterance = session.first_user_utterance().map(str::to_string);

        match self
            .retrieval
            .run(intent_def, first_utterance.as_deref(), &session.collected)
            .await
        {
            Ok(answer) => {
                advance(session, Stage::Complete);
                session.record_answer(&answer.summary, answer.hits.clone());
                session.touch();
                TurnOutcome {
                    session_id: id,
                    response: answer.summary,
                    requires_input: false,
                    next_question: None,
                    collected: session.collected.clone(),
                    results: Some(answer.hits),
                    status: TurnStatus::Complete,
                }
            }
            Err(error) => {
                tracing::warn!(session = %id, %error, "retrieval failed");
                advance(session, Stage::Error);
                let outcome = TurnOutcome {
                    session_id: id,
                    response: format!(
                        "I encountered an error while searching: {}. Everything you've \
told me is saved, so you can just ask again.",
                        error
                    ),
                    requires_input: false,
                    next_question: None,
                    collected: session.collected.clone(),
                    results: None,
                    status: TurnStatus::Error,
                };
                finish(session, outcome)
            }
        }
    }

    /// Resolves an outstanding reuse confirmation.
    ///
    /// Returns true when the reply was an explicit yes/no, which consumes
    /// the turn's utterance (nothing left to extract).
    fn resolve_pending_confirmation(&self, session: &mut Session, utterance: &str) -> bool {
        if !session.stage.awaits_confirmation() {
            return false;
        }
        let Some(pending) = session.pending.take() else {
            return false;
        };

        let explicit = match parse_confirmation(utterance) {
            ConfirmationReply::Affirm => {
                session.collected = pending.reusable.iter().cloned().collect();
                true
            }
            ConfirmationReply::Decline => {
                session.clear_entities();
                true
            }
            ConfirmationReply::Other => {
                // Implicit decline: forget the old entities and process the
                // reply as a fresh utterance for the new intent.
                session.clear_entities();
                false
            }
        };
        session.adopt_intent(&pending.candidate_intent);
        advance(session, Stage::Collecting);
        explicit
    }

    /// Applies the intent-resolution rules. Returns an outcome only when
    /// the turn ends here (a reuse confirmation was issued).
    fn resolve_intent(
        &self,
        session: &mut Session,
        id: SessionId,
        catalog: &Catalog,
        detected: &str,
    ) -> Option<TurnOutcome> {
        match session.intent.clone() {
            Some(current) if session.stage == Stage::Collecting => {
                // Mid-collection the adopted intent is authoritative.
                if detected != current {
                    tracing::debug!(%current, %detected, "mid-collection intent pinned");
                }
                None
            }
            Some(current) if session.stage.has_answered() => {
                if detected != current {
                    session.clear_entities();
                    session.adopt_intent(detected);
                } else if self.completion_policy == CompletionPolicy::Clear {
                    session.clear_entities();
                }
                None
            }
            Some(current) if detected != current && !session.collected.is_empty() => {
                match plan_intent_switch(catalog, detected, &session.collected) {
                    SwitchPlan::FreshStart => {
                        session.clear_entities();
                        session.adopt_intent(detected);
                        None
                    }
                    SwitchPlan::NeedsConfirmation(pending) => {
                        let prompt = pending.prompt.clone();
                        session.pending = Some(pending);
                        advance(session, Stage::Confirming);
                        let outcome = TurnOutcome {
                            session_id: id,
                            response: prompt.clone(),
                            requires_input: true,
                            next_question: Some(prompt),
                            collected: session.collected.clone(),
                            results: None,
                            status: TurnStatus::Confirming,
                        };
                        Some(finish(session, outcome))
                    }
                }
            }
            Some(current) => {
                if detected != current {
                    session.adopt_intent(detected);
                }
                None
            }
            None => {
                session.adopt_intent(detected);
                None
            }
        }
    }
}

/// The entity currently being asked for, when mid-collection.
fn awaiting_entity(catalog: &Catalog, session: &Session) -> Option<String> {
    if session.stage != Stage::Collecting {
        return None;
    }
    let intent = session.intent.as_deref()?;
    catalog
        .required_entities(intent)
        .into_iter()
        .find(|e| !session.collected.contains_key(e))
}

/// Validated stage transition; an invalid one is a bug, logged and forced.
fn advance(session: &mut Session, target: Stage) {
    match session.stage.transition_to(target) {
        Ok(next) => session.stage = next,
        Err(error) => {
            tracing::error!(%error, "unexpected stage transition");
            session.stage = target;
        }
    }
}

/// Records the response in the transcript and refreshes activity.
fn finish(session: &mut Session, outcome: TurnOutcome) -> TurnOutcome {
    session.record_assistant(&outcome.response);
    session.touch();
    outcome
}
