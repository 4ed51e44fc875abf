//! Intent and entity definitions.
//!
//! These are the units of the backing catalog file. Definitions are
//! immutable once loaded; consumers look them up through the registry and
//! never mutate them.

use serde::{Deserialize, Serialize};

/// A single piece of information that an intent may require or accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Identifier, filled from the catalog map key.
    #[serde(default)]
    pub id: String,

    /// What this entity means, shown to the language model.
    #[serde(default)]
    pub description: String,

    /// Question asked when the entity is missing.
    #[serde(default)]
    pub question_template: String,

    /// Example values appended to the question (first three shown).
    #[serde(default)]
    pub examples: Vec<String>,

    /// Acknowledgment variants with a `{value}` placeholder, cycled as
    /// entities accumulate.
    #[serde(default)]
    pub acknowledgments: Vec<String>,

    /// Whether the question text may be generated by the model instead of
    /// the static template.
    #[serde(default)]
    pub dynamic_question: bool,
}

/// A user goal category together with everything the service needs to
/// collect for it and how to answer it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDefinition {
    /// Identifier, filled from the catalog map key.
    #[serde(default)]
    pub id: String,

    /// What this intent covers, shown to the language model.
    #[serde(default)]
    pub description: String,

    /// Entities that must be collected, in the order they are asked for.
    #[serde(default)]
    pub required_entities: Vec<String>,

    /// Entities that improve the answer but are not required.
    #[serde(default)]
    pub optional_entities: Vec<String>,

    /// Keywords for the local pre-classification hint.
    #[serde(default)]
    pub hint_keywords: Vec<String>,

    /// Collected entities appended to the retrieval query as demographic
    /// qualifiers (age, income, county).
    #[serde(default)]
    pub search_qualifiers: Vec<String>,

    /// How the final answer is presented.
    #[serde(default)]
    pub answer_format: AnswerFormat,

    /// Retrieval query template with `{entity}` placeholders. When absent
    /// the first user utterance is reused as the query.
    #[serde(default)]
    pub query_template: Option<String>,

    /// Instruction prepended to the summarization prompt for narrative
    /// answers.
    #[serde(default)]
    pub summary_instruction: Option<String>,
}

/// Presentation shape of a completed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnswerFormat {
    /// A count line plus the raw result list.
    #[default]
    List,
    /// A synthesized paragraph built from the top results.
    Narrative,
}
