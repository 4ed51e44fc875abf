//! Answer text construction from search hits.

use std::collections::HashMap;

use crate::domain::catalog::IntentDefinition;
use crate::ports::SearchHit;

/// Hits fed into the summarization prompt and the fallback text.
pub const SUMMARY_HITS: usize = 5;

/// The count-plus-profile line used for list-format answers.
pub fn profile_summary(
    intent: &IntentDefinition,
    collected: &HashMap<String, String>,
    hit_count: usize,
) -> String {
    let parts: Vec<String> = intent
        .search_qualifiers
        .iter()
        .filter_map(|qualifier| {
            collected.get(qualifier).map(|value| match qualifier.as_str() {
                "age" => format!("Age: {}", value),
                "income" => format!("Income: ${}", value),
                "county" => format!("County: {}", value),
                other => format!("{}: {}", other, value),
            })
        })
        .collect();

    if parts.is_empty() {
        format!("I found {} results for you:", hit_count)
    } else {
        format!(
            "Based on your profile ({}), I found {} options for you:",
            parts.join(", "),
            hit_count
        )
    }
}

/// The summarization prompt for narrative-format answers.
pub fn synthesis_prompt(intent: &IntentDefinition, hits: &[SearchHit]) -> String {
    let instruction = intent
        .summary_instruction
        .as_deref()
        .unwrap_or("Answer the user's question using the search results below.");

    let mut prompt = format!("{}\n\nSearch results:\n", instruction);
    for (i, hit) in hits.iter().take(SUMMARY_HITS).enumerate() {
        prompt.push_str(&format!("{}. {}: {}\n", i + 1, hit.title, hit.excerpt()));
    }
    prompt.push_str(
        "\nWrite a concise, helpful answer in plain text, two short paragraphs at most. \
Do not mention that you were given search results.",
    );
    prompt
}

/// Raw-excerpt answer used when summarization fails.
pub fn fallback_summary(hits: &[SearchHit]) -> String {
    let mut text = "Here's what I found:".to_string();
    for hit in hits.iter().take(SUMMARY_HITS) {
        text.push_str(&format!("\n- {}: {}", hit.title, hit.excerpt()));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::AnswerFormat;

    fn intent(qualifiers: Vec<&str>, instruction: Option<&str>) -> IntentDefinition {
        IntentDefinition {
            id: "FAQ".to_string(),
            description: String::new(),
            required_entities: Vec::new(),
            optional_entities: Vec::new(),
            hint_keywords: Vec::new(),
            search_qualifiers: qualifiers.into_iter().map(String::from).collect(),
            answer_format: AnswerFormat::Narrative,
            query_template: None,
            summary_instruction: instruction.map(String::from),
        }
    }

    fn hits(n: usize) -> Vec<SearchHit> {
        (0..n)
            .map(|i| {
                SearchHit::new(
                    format!("Result {}", i),
                    format!("Description {}", i),
                    format!("https://example.com/{}", i),
                )
            })
            .collect()
    }

    #[test]
    fn profile_summary_lists_collected_qualifiers() {
        let mut collected = HashMap::new();
        collected.insert("age".to_string(), "43".to_string());
        collected.insert("county".to_string(), "Broward".to_string());

        let line = profile_summary(&intent(vec!["age", "income", "county"], None), &collected, 7);
        assert_eq!(
            line,
            "Based on your profile (Age: 43, County: Broward), I found 7 options for you:"
        );
    }

    #[test]
    fn profile_summary_without_qualifiers_is_a_plain_count() {
        let line = profile_summary(&intent(vec![], None), &HashMap::new(), 3);
        assert_eq!(line, "I found 3 results for you:");
    }

    #[test]
    fn synthesis_prompt_uses_intent_instruction_and_top_hits() {
        let prompt = synthesis_prompt(
            &intent(vec![], Some("Explain the concept the user asked about.")),
            &hits(8),
        );

        assert!(prompt.starts_with("Explain the concept the user asked about."));
        assert!(prompt.contains("1. Result 0: Description 0"));
        assert!(prompt.contains("5. Result 4"));
        assert!(!prompt.contains("Result 5"));
    }

    #[test]
    fn synthesis_prompt_has_default_instruction() {
        let prompt = synthesis_prompt(&intent(vec![], None), &hits(1));
        assert!(prompt.starts_with("Answer the user's question"));
    }

    #[test]
    fn fallback_summary_concatenates_excerpts() {
        let text = fallback_summary(&hits(7));
        assert!(text.starts_with("Here's what I found:"));
        assert!(text.contains("- Result 0: Description 0"));
        assert!(text.contains("- Result 4"));
        assert!(!text.contains("Result 5"));
    }
}
