//! Retrieval query composition.

use std::collections::HashMap;

use crate::domain::catalog::IntentDefinition;

/// Builds the search query for an intent.
///
/// Intents with a query template get it filled from collected entities;
/// everything else reuses the user's first utterance. The intent's search
/// qualifiers (age, income, county) are appended when collected, so the
/// query carries the user's profile.
pub fn build_query(
    intent: &IntentDefinition,
    first_utterance: Option<&str>,
    collected: &HashMap<String, String>,
) -> String {
    let mut query = match &intent.query_template {
        Some(template) => substitute(template, collected),
        None => first_utterance.unwrap_or_default().trim().to_string(),
    };

    for qualifier in &intent.search_qualifiers {
        let Some(value) = collected.get(qualifier) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        match qualifier.as_str() {
            "age" => query.push_str(&format!(" for {} year old", value)),
            "income" => query.push_str(&format!(" with annual income ${}", value)),
            "county" => query.push_str(&format!(" in {} county", value)),
            other => {
                let _ = other;
                query.push_str(&format!(" {}", value));
            }
        }
    }

    query
}

/// Replaces `{entity}` placeholders with collected values (blank for
/// absent entities) and collapses the resulting whitespace.
fn substitute(template: &str, collected: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        match rest[open..].find('}') {
            Some(close_offset) => {
                let key = &rest[open + 1..open + close_offset];
                if let Some(value) = collected.get(key) {
                    out.push_str(value);
                }
                rest = &rest[open + close_offset + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
