//! Question text selection for missing entities.
//!
//! Two capabilities behind one value: a static templated question with
//! appended examples, or a model-generated question that falls back to the
//! template when generation fails. The choice is made once from
//! configuration, not per call site.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ports::{NluProvider, NluRequest};

use super::definitions::EntityDefinition;

/// Conversation context available when phrasing a question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionContext<'a> {
    /// The intent being collected for, when known.
    pub intent: Option<&'a str>,
    /// Entities already collected this conversation.
    pub collected: &'a HashMap<String, String>,
    /// Recent transcript as (role, text) pairs.
    pub recent_history: &'a [(String, String)],
}

/// How question text is produced for a missing entity.
#[derive(Clone)]
pub enum QuestionSource {
    /// Always use the entity's static template.
    Template,
    /// Generate with the model for entities that opt in; template
    /// otherwise and on any generation failure.
    Generated { provider: Arc<dyn NluProvider> },
}

impl QuestionSource {
    /// Produces the question for one entity.
    ///
    /// Generation failures are invisible to the caller: the static
    /// template is returned and a warning is logged.
    pub async fn question_for(
        &self,
        entity: &EntityDefinition,
        ctx: &QuestionContext<'_>,
    ) -> String {
        match self {
            Self::Template => template_question(entity),
            Self::Generated { provider } => {
                if !entity.dynamic_question {
                    return template_question(entity);
                }
                let request = NluRequest::new(generation_prompt(entity, ctx))
                    .with_temperature(0.7)
                    .with_max_output_tokens(256);
                match provider.complete(request).await {
                    Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
                    Ok(_) => template_question(entity),
                    Err(error) => {
                        tracing::warn!(
                            entity = %entity.id,
                            %error,
                            "question generation failed, using template"
                        );
                        template_question(entity)
                    }
                }
            }
        }
    }
}

/// The static question: template text plus up to three examples.
pub fn template_question(entity: &EntityDefinition) -> String {
    let mut question = if entity.question_template.trim().is_empty() {
        format!("Could you please provide: {}?", entity.id)
    } else {
        entity.question_template.clone()
    };

    if !entity.examples.is_empty() {
        let shown: Vec<&str> = entity.examples.iter().take(3).map(String::as_str).collect();
        question.push_str(&format!(" (e.g., {})", shown.join(", ")));
    }

    question
}

fn generation_prompt(entity: &EntityDefinition, ctx: &QuestionContext<'_>) -> String {
    let mut context = String::new();
    if let Some(intent) = ctx.intent {
        context.push_str(&format!("Intent: {}\n", intent));
    }
    if !ctx.collected.is_empty() {
        let mut pairs: Vec<String> = ctx
            .collected
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        pairs.sort();
        context.push_str(&format!("Already collected: {}\n", pairs.join(", ")));
    }
    if !ctx.recent_history.is_empty() {
        context.push_str("Recent conversation:\n");
        for (role, text) in ctx.recent_history {
            context.push_str(&format!("- {}: {}\n", role, text));
        }
    }

    format!(
        "Generate a natural, conversational question to ask the user for the \
following information:\n\n\
Information needed: {}\n\
Description: {}\n\
Examples: {}\n\n\
Context:\n{}\n\
The question must feel natural given the conversation flow, clearly ask for \
the needed information, and stay short (one or two sentences).\n\n\
Return ONLY the question text, no additional formatting or explanation.",
        entity.id,
        entity.description,
        entity.examples.join(", "),
        context
    )
}
