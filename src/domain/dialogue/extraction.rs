//! Intent detection and entity extraction via the language model.
//!
//! Builds one context-aware prompt per turn, sends it through the NLU
//! port, and interprets the structured reply. The model's output is
//! treated as untrusted: fenced markdown is tolerated, unknown entity
//! keys are dropped, and an unknown intent falls back to the catalog's
//! default instead of failing the turn.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::catalog::Catalog;
use crate::ports::{NluError, NluProvider, NluRequest};

/// What the model detected in one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Detected intent, validated against the catalog (fallback
    /// substituted for unknown ones).
    pub intent: String,
    /// Extracted entities in the order the model returned them, filtered
    /// to known identifiers with empty values dropped.
    pub entities: Vec<(String, String)>,
}

/// Conversation context injected into the extraction prompt.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    /// Current catalog snapshot.
    pub catalog: &'a Catalog,
    /// The session's adopted intent, when one exists.
    pub current_intent: Option<&'a str>,
    /// Entities collected so far.
    pub collected: &'a HashMap<String, String>,
    /// The entity the assistant just asked for, when mid-collection.
    /// Bare numeric or one-word replies are attributed to it.
    pub awaiting_entity: Option<&'a str>,
}

/// Extracts (intent, entities) from a user utterance.
pub struct EntityExtractor {
    provider: Arc<dyn NluProvider>,
}

impl EntityExtractor {
    /// Creates an extractor over the given model provider.
    pub fn new(provider: Arc<dyn NluProvider>) -> Self {
        Self { provider }
    }

    /// Runs one extraction.
    ///
    /// # Errors
    ///
    /// Returns [`NluError`] when the model service is unreachable or its
    /// reply cannot be parsed as the expected JSON shape after fence
    /// stripping.
    pub async fn extract(
        &self,
        utterance: &str,
        ctx: &ExtractionContext<'_>,
    ) -> Result<ExtractionResult, NluError> {
        let prompt = build_prompt(utterance, ctx);
        let raw = self.provider.complete(NluRequest::new(prompt)).await?;
        parse_response(&raw, ctx.catalog)
    }
}

fn build_prompt(utterance: &str, ctx: &ExtractionContext<'_>) -> String {
    let catalog = ctx.catalog;
    let mut prompt = format!("Analyze this user message: \"{}\"\n", utterance);

    if let Some(current) = ctx.current_intent {
        prompt.push_str(&format!("\nThe conversation so far is about: {}.\n", current));
    }

    if !ctx.collected.is_empty() {
        let mut pairs: Vec<String> = ctx
            .collected
            .iter()
            .map(|(k, v)| format!("{}: \"{}\"", k, v))
            .collect();
        pairs.sort();
        prompt.push_str(&format!(
            "\nAlready collected information: {{{}}}\n",
            pairs.join(", ")
        ));
    }

    if let Some(hint) = catalog.classify_hint(utterance) {
        prompt.push_str(&format!(
            "\nHINT: This looks like a {} query based on keywords.\n",
            hint
        ));
    }

    if let Some(awaiting) = ctx.awaiting_entity {
        prompt.push_str(&format!(
            "\nIMPORTANT: We are currently asking the user for their '{}'. \
If the message contains ONLY a number or a short value, interpret it as the {}.\n",
            awaiting, awaiting
        ));
    }

    prompt.push_str("\nFirst, determine the PRIMARY INTENT:\n");
    for id in catalog.intent_ids() {
        if let Some(intent) = catalog.intent(&id) {
            prompt.push_str(&format!("- {}: {}\n", intent.id, intent.description));
        }
    }

    prompt.push_str("\nThen extract entities ONLY if they are EXPLICITLY mentioned:\n");
    for id in catalog.entity_ids() {
        if let Some(entity) = catalog.entity(&id) {
            if entity.examples.is_empty() {
                prompt.push_str(&format!("- {}: {}\n", entity.id, entity.description));
            } else {
                prompt.push_str(&format!(
                    "- {}: {} (e.g., {})\n",
                    entity.id,
                    entity.description,
                    entity.examples.join(", ")
                ));
            }
        }
    }

    prompt.push_str(&format!(
        "\nDo NOT invent entities the user did not state.\n\n\
Return JSON only:\n\
{{\"intent\": \"<one of: {}>\", \"entities\": {{\"<entity_name>\": \"<value>\"}}}}",
        catalog.intent_ids().join(", ")
    ));

    prompt
}

/// Strips a surrounding markdown fence, including an optional leading
/// `json` language tag.
fn strip_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    let inner = inner.trim();
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim().to_string()
}

fn parse_response(raw: &str, catalog: &Catalog) -> Result<ExtractionResult, NluError> {
    let body = strip_fences(raw);
    let value: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| NluError::parse(format!("expected intent/entities JSON: {}", e)))?;

    let detected = value
        .get("intent")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let intent = if catalog.is_known_intent(detected) {
        detected.to_string()
    } else {
        if !detected.is_empty() {
            tracing::warn!(intent = detected, "unknown intent detected, using fallback");
        }
        catalog.fallback_intent().to_string()
    };

    let mut entities = Vec::new();
    if let Some(map) = value.get("entities").and_then(|v| v.as_object()) {
        for (key, raw_value) in map {
            if !catalog.is_known_entity(key) {
                continue;
            }
            let text = match raw_value {
                serde_json::Value::String(s) => s.trim().to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            if text.is_empty() {
                continue;
            }
            entities.push((key.clone(), text));
        }
    }

    Ok(ExtractionResult { intent, entities })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{
                "fallback_intent": "FAQ",
                "intents": {
                    "PlanInfo": {
                        "description": "Find a plan",
                        "required_entities": ["plan_name", "age"]
                    },
                    "News": {
                        "description": "Latest updates",
                        "hint_keywords": ["news", "latest"]
                    },
                    "FAQ": {"description": "General question"}
                },
                "entities": {
                    "plan_name": {
                        "description": "Plan name",
                        "examples": ["Molina Silver 1 HMO"]
                    },
                    "age": {"description": "Age, number only"},
                    "county": {"description": "County name"}
                }
            }"#,
        )
        .unwrap()
    }

    struct ScriptedProvider(String);

    #[async_trait]
    impl NluProvider for ScriptedProvider {
        async fn complete(&self, _request: NluRequest) -> Result<String, NluError> {
            Ok(self.0.clone())
        }
    }

    struct DownProvider;

    #[async_trait]
    impl NluProvider for DownProvider {
        async fn complete(&self, _request: NluRequest) -> Result<String, NluError> {
            Err(NluError::unavailable("connection refused"))
        }
    }

    fn ctx<'a>(catalog: &'a Catalog, collected: &'a HashMap<String, String>) -> ExtractionContext<'a> {
        ExtractionContext {
            catalog,
            current_intent: None,
            collected,
            awaiting_entity: None,
        }
    }

    mod fence_stripping {
        use super::*;

        #[test]
        fn passes_bare_text_through() {
            assert_eq!(strip_fences(r#"{"a": 1}"#), r#"{"a": 1}"#);
        }

        #[test]
        fn strips_plain_fence() {
            assert_eq!(strip_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        }

        #[test]
        fn strips_fence_with_json_tag() {
            assert_eq!(strip_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        }

        #[test]
        fn strips_single_line_fence() {
            assert_eq!(strip_fences("```json {\"a\": 1} ```"), "{\"a\": 1}");
        }

        #[test]
        fn tolerates_missing_closing_fence() {
            assert_eq!(strip_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn parses_intent_and_entities() {
            let result = parse_response(
                r#"{"intent": "PlanInfo", "entities": {"age": "43", "county": "Broward"}}"#,
                &catalog(),
            )
            .unwrap();

            assert_eq!(result.intent, "PlanInfo");
            assert!(result
                .entities
                .contains(&("age".to_string(), "43".to_string())));
            assert!(result
                .entities
                .contains(&("county".to_string(), "Broward".to_string())));
        }

        #[test]
        fn drops_unknown_entity_keys() {
            let result = parse_response(
                r#"{"intent": "PlanInfo", "entities": {"age": "43", "shoe_size": "11"}}"#,
                &catalog(),
            )
            .unwrap();

            assert_eq!(result.entities.len(), 1);
            assert_eq!(result.entities[0].0, "age");
        }

        #[test]
        fn drops_empty_values() {
            let result = parse_response(
                r#"{"intent": "PlanInfo", "entities": {"age": "", "county": "  "}}"#,
                &catalog(),
            )
            .unwrap();
            assert!(result.entities.is_empty());
        }

        #[test]
        fn stringifies_numeric_values() {
            let result = parse_response(
                r#"{"intent": "PlanInfo", "entities": {"age": 43}}"#,
                &catalog(),
            )
            .unwrap();
            assert_eq!(result.entities[0], ("age".to_string(), "43".to_string()));
        }

        #[test]
        fn unknown_intent_falls_back() {
            let result = parse_response(
                r#"{"intent": "OrderPizza", "entities": {}}"#,
                &catalog(),
            )
            .unwrap();
            assert_eq!(result.intent, "FAQ");
        }

        #[test]
        fn missing_intent_falls_back() {
            let result = parse_response(r#"{"entities": {"age": "43"}}"#, &catalog()).unwrap();
            assert_eq!(result.intent, "FAQ");
        }

        #[test]
        fn non_json_is_a_parse_error() {
            let result = parse_response("I could not decide.", &catalog());
            assert!(matches!(result, Err(NluError::Parse(_))));
        }
    }

    mod prompt_content {
        use super::*;

        #[test]
        fn lists_intents_and_entities_from_catalog() {
            let catalog = catalog();
            let collected = HashMap::new();
            let prompt = build_prompt("tell me about plans", &ctx(&catalog, &collected));

            assert!(prompt.contains("- PlanInfo: Find a plan"));
            assert!(prompt.contains("- age: Age, number only"));
            assert!(prompt.contains("(e.g., Molina Silver 1 HMO)"));
        }

        #[test]
        fn includes_collected_entities() {
            let catalog = catalog();
            let mut collected = HashMap::new();
            collected.insert("age".to_string(), "43".to_string());
            let prompt = build_prompt("in Broward", &ctx(&catalog, &collected));

            assert!(prompt.contains("Already collected information"));
            assert!(prompt.contains("age: \"43\""));
        }

        #[test]
        fn includes_keyword_hint_when_one_matches() {
            let catalog = catalog();
            let collected = HashMap::new();
            let prompt = build_prompt("any news about humana", &ctx(&catalog, &collected));
            assert!(prompt.contains("HINT: This looks like a News query"));
        }

        #[test]
        fn omits_hint_without_keyword_match() {
            let catalog = catalog();
            let collected = HashMap::new();
            let prompt = build_prompt("tell me about molina", &ctx(&catalog, &collected));
            assert!(!prompt.contains("HINT:"));
        }

        #[test]
        fn includes_current_intent_when_set() {
            let catalog = catalog();
            let collected = HashMap::new();
            let mut context = ctx(&catalog, &collected);
            context.current_intent = Some("PlanInfo");
            let prompt = build_prompt("Broward", &context);
            assert!(prompt.contains("The conversation so far is about: PlanInfo."));
        }

        #[test]
        fn includes_awaiting_entity_instruction() {
            let catalog = catalog();
            let collected = HashMap::new();
            let mut context = ctx(&catalog, &collected);
            context.awaiting_entity = Some("age");
            let prompt = build_prompt("43", &context);
            assert!(prompt.contains("currently asking the user for their 'age'"));
        }
    }

    mod extraction {
        use super::*;

        #[tokio::test]
        async fn extracts_through_provider() {
            let extractor = EntityExtractor::new(Arc::new(ScriptedProvider(
                "```json\n{\"intent\": \"PlanInfo\", \"entities\": {\"age\": \"43\"}}\n```"
                    .to_string(),
            )));
            let catalog = catalog();
            let collected = HashMap::new();
            let result = extractor
                .extract("I'm 43", &ctx(&catalog, &collected))
                .await
                .unwrap();

            assert_eq!(result.intent, "PlanInfo");
            assert_eq!(result.entities[0], ("age".to_string(), "43".to_string()));
        }

        #[tokio::test]
        async fn provider_failure_propagates() {
            let extractor = EntityExtractor::new(Arc::new(DownProvider));
            let catalog = catalog();
            let collected = HashMap::new();
            let result = extractor
                .extract("anything", &ctx(&catalog, &collected))
                .await;
            assert!(matches!(result, Err(NluError::Unavailable { .. })));
        }
    }
}
