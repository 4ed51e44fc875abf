//! Validated, immutable catalog of intents and entities.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use super::definitions::{EntityDefinition, IntentDefinition};

/// Errors from loading or validating the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog file is not valid JSON: {0}")]
    Parse(String),

    #[error("Catalog defines no intents")]
    NoIntents,

    #[error("Catalog defines no entities")]
    NoEntities,

    #[error("Intent '{intent}' references unknown entity '{entity}'")]
    UnknownEntityReference { intent: String, entity: String },

    #[error("Fallback intent '{0}' is not defined")]
    UnknownFallbackIntent(String),

    #[error("Catalog has no backing file to reload from")]
    NoBackingFile,
}

/// Raw file shape of the catalog.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    fallback_intent: String,
    intents: HashMap<String, IntentDefinition>,
    entities: HashMap<String, EntityDefinition>,
}

/// Complete, validated parse of the backing definitions file.
///
/// A catalog is built whole and never mutated; the registry swaps entire
/// snapshots on reload.
#[derive(Debug, Clone)]
pub struct Catalog {
    intents: HashMap<String, IntentDefinition>,
    entities: HashMap<String, EntityDefinition>,
    fallback_intent: String,
}

impl Catalog {
    /// Parses and validates a catalog from JSON text.
    ///
    /// A malformed file never yields a partially usable catalog: every
    /// entity reference and the fallback intent must resolve.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;

        if file.intents.is_empty() {
            return Err(CatalogError::NoIntents);
        }
        if file.entities.is_empty() {
            return Err(CatalogError::NoEntities);
        }

        let mut entities = file.entities;
        for (id, entity) in entities.iter_mut() {
            entity.id = id.clone();
        }

        let mut intents = file.intents;
        for (id, intent) in intents.iter_mut() {
            intent.id = id.clone();
        }

        for intent in intents.values() {
            for entity_id in intent
                .required_entities
                .iter()
                .chain(intent.optional_entities.iter())
                .chain(intent.search_qualifiers.iter())
            {
                if !entities.contains_key(entity_id) {
                    return Err(CatalogError::UnknownEntityReference {
                        intent: intent.id.clone(),
                        entity: entity_id.clone(),
                    });
                }
            }
        }

        if !intents.contains_key(&file.fallback_intent) {
            return Err(CatalogError::UnknownFallbackIntent(file.fallback_intent));
        }

        Ok(Self {
            intents,
            entities,
            fallback_intent: file.fallback_intent,
        })
    }

    /// Looks up an intent definition.
    pub fn intent(&self, id: &str) -> Option<&IntentDefinition> {
        self.intents.get(id)
    }

    /// Looks up an entity definition.
    pub fn entity(&self, id: &str) -> Option<&EntityDefinition> {
        self.entities.get(id)
    }

    /// Returns true if the intent is defined.
    pub fn is_known_intent(&self, id: &str) -> bool {
        self.intents.contains_key(id)
    }

    /// Returns true if the entity is defined.
    pub fn is_known_entity(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// All intent identifiers, sorted.
    pub fn intent_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.intents.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// All entity identifiers, sorted.
    pub fn entity_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entities.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Required entities for an intent, in collection order.
    ///
    /// Unknown intents yield an empty list.
    pub fn required_entities(&self, intent: &str) -> Vec<String> {
        self.intents
            .get(intent)
            .map(|i| i.required_entities.clone())
            .unwrap_or_default()
    }

    /// Optional entities for an intent.
    pub fn optional_entities(&self, intent: &str) -> Vec<String> {
        self.intents
            .get(intent)
            .map(|i| i.optional_entities.clone())
            .unwrap_or_default()
    }

    /// The intent substituted when detection yields an unknown one.
    pub fn fallback_intent(&self) -> &str {
        &self.fallback_intent
    }

    /// Local keyword pre-classification over intent hint keywords.
    ///
    /// Returns the first intent (by sorted id, for determinism) with a
    /// hint keyword contained in the lowercased utterance.
    pub fn classify_hint(&self, utterance: &str) -> Option<&str> {
        let lowered = utterance.to_lowercase();
        self.intent_ids()
            .into_iter()
            .filter_map(|id| self.intents.get(&id))
            .find(|intent| {
                intent
                    .hint_keywords
                    .iter()
                    .any(|kw| lowered.contains(kw.as_str()))
            })
            .map(|intent| self.intents[&intent.id].id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "fallback_intent": "FAQ",
            "intents": {
                "PlanInfo": {
                    "description": "Find a plan",
                    "required_entities": ["plan_name", "age"],
                    "optional_entities": ["income"],
                    "hint_keywords": ["plan for me"]
                },
                "FAQ": {
                    "description": "General question",
                    "required_entities": ["question_topic"],
                    "hint_keywords": ["what is", "explain"]
                }
            },
            "entities": {
                "plan_name": {"question_template": "Which plan?"},
                "age": {"question_template": "Your age?"},
                "income": {"question_template": "Your income?"},
                "question_topic": {"question_template": "What topic?"}
            }
        }"#
    }

    #[test]
    fn parses_and_fills_ids() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        assert_eq!(catalog.intent("PlanInfo").unwrap().id, "PlanInfo");
        assert_eq!(catalog.entity("age").unwrap().id, "age");
    }

    #[test]
    fn required_entities_preserve_order() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        assert_eq!(
            catalog.required_entities("PlanInfo"),
            vec!["plan_name", "age"]
        );
    }

    #[test]
    fn unknown_intent_yields_empty_requirements() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        assert!(catalog.required_entities("Nope").is_empty());
        assert!(catalog.optional_entities("Nope").is_empty());
    }

    #[test]
    fn rejects_invalid_json() {
        let result = Catalog::from_json("{not json");
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn rejects_empty_intent_set() {
        let result = Catalog::from_json(
            r#"{"fallback_intent": "x", "intents": {}, "entities": {"a": {}}}"#,
        );
        assert!(matches!(result, Err(CatalogError::NoIntents)));
    }

    #[test]
    fn rejects_empty_entity_set() {
        let result = Catalog::from_json(
            r#"{"fallback_intent": "A", "intents": {"A": {}}, "entities": {}}"#,
        );
        assert!(matches!(result, Err(CatalogError::NoEntities)));
    }

    #[test]
    fn rejects_unknown_entity_reference() {
        let result = Catalog::from_json(
            r#"{
                "fallback_intent": "A",
                "intents": {"A": {"required_entities": ["missing"]}},
                "entities": {"present": {}}
            }"#,
        );
        assert!(matches!(
            result,
            Err(CatalogError::UnknownEntityReference { .. })
        ));
    }

    #[test]
    fn rejects_unknown_fallback_intent() {
        let result = Catalog::from_json(
            r#"{
                "fallback_intent": "Ghost",
                "intents": {"A": {}},
                "entities": {"a": {}}
            }"#,
        );
        assert!(matches!(
            result,
            Err(CatalogError::UnknownFallbackIntent(_))
        ));
    }

    #[test]
    fn classify_hint_matches_keywords() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        assert_eq!(
            catalog.classify_hint("Can you explain deductibles?"),
            Some("FAQ")
        );
        assert_eq!(catalog.classify_hint("I want a quote"), None);
    }

    #[test]
    fn ids_are_sorted() {
        let catalog = Catalog::from_json(sample_json()).unwrap();
        assert_eq!(catalog.intent_ids(), vec!["FAQ", "PlanInfo"]);
        assert_eq!(
            catalog.entity_ids(),
            vec!["age", "income", "plan_name", "question_topic"]
        );
    }
}
