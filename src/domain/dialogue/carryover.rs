//! Entity reuse across intent switches.
//!
//! When the detected intent differs from the session's intent and entities
//! have already been collected, the overlap with the new intent's entity
//! set decides what happens: no overlap starts fresh silently, any overlap
//! asks the user before reusing.

use std::collections::HashMap;

use crate::domain::catalog::Catalog;

use super::session::PendingConfirmation;

/// Outcome of planning an intent switch.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchPlan {
    /// Nothing carries over: clear entities and adopt the new intent
    /// without a confirmation step.
    FreshStart,
    /// Some entities are valid for the new intent; the user must confirm
    /// before they are reused.
    NeedsConfirmation(PendingConfirmation),
}

/// Plans what to do with collected entities when the conversation moves
/// to `new_intent`.
///
/// Reusable entities are listed in the new intent's collection order
/// (required first, then optional) so the confirmation reads naturally.
pub fn plan_intent_switch(
    catalog: &Catalog,
    new_intent: &str,
    collected: &HashMap<String, String>,
) -> SwitchPlan {
    let mut candidate_ids = catalog.required_entities(new_intent);
    candidate_ids.extend(catalog.optional_entities(new_intent));

    let reusable: Vec<(String, String)> = candidate_ids
        .iter()
        .filter_map(|id| collected.get(id).map(|value| (id.clone(), value.clone())))
        .collect();

    if reusable.is_empty() {
        return SwitchPlan::FreshStart;
    }

    let prompt = confirmation_prompt(catalog, new_intent, &reusable);
    SwitchPlan::NeedsConfirmation(PendingConfirmation {
        candidate_intent: new_intent.to_string(),
        reusable,
        prompt,
    })
}

fn confirmation_prompt(
    catalog: &Catalog,
    new_intent: &str,
    reusable: &[(String, String)],
) -> String {
    let subject = catalog
        .intent(new_intent)
        .filter(|i| !i.description.is_empty())
        .map(|i| i.description.to_lowercase())
        .unwrap_or_else(|| new_intent.to_string());

    let listed: Vec<String> = reusable
        .iter()
        .map(|(id, value)| format!("{}: \"{}\"", id.replace('_', " "), value))
        .collect();

    format!(
        "It looks like you now have a question about {}. I still have {} from \
our conversation. Should I keep using this information? (yes/no)",
        subject,
        listed.join(", ")
    )
}

/// How a reply to the reuse confirmation is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationReply {
    /// Keep the proposed entities.
    Affirm,
    /// Discard them and start collecting fresh.
    Decline,
    /// Neither a clear yes nor no: treated as an implicit decline whose
    /// text is processed as a new utterance.
    Other,
}

const AFFIRM_WORDS: &[&str] = &["yes", "y", "yeah", "yep", "sure", "ok", "okay", "keep", "correct"];
const DECLINE_WORDS: &[&str] = &["no", "n", "nope", "nah", "discard", "fresh", "restart"];

/// Classifies a reply to the reuse confirmation.
///
/// Only short replies (four words or fewer) count as explicit answers; a
/// longer reply is assumed to be a new question and classified `Other`.
/// Decline words win over affirm words in mixed replies.
pub fn parse_confirmation(reply: &str) -> ConfirmationReply {
    let lowered = reply.trim().to_lowercase();
    let words: Vec<&str> = lowered
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .collect();

    if words.is_empty() || words.len() > 4 {
        return ConfirmationReply::Other;
    }

    if words.iter().any(|w| DECLINE_WORDS.contains(w)) {
        return ConfirmationReply::Decline;
    }
    if words.iter().any(|w| AFFIRM_WORDS.contains(w)) {
        return ConfirmationReply::Affirm;
    }
    ConfirmationReply::Other
}
