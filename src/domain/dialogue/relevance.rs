//! On-topic relevance filter.
//!
//! A cheap, deterministic screen applied to an utterance before any model
//! call is made. Rejections are ordinary conversational outcomes, not
//! errors. Rule order and thresholds are fixed; changing either changes
//! which utterances reach the model.

use once_cell::sync::Lazy;

/// Insurance-product vocabulary that alone marks an utterance relevant.
static STRONG_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "insurance",
        "insurer",
        "plan",
        "plans",
        "coverage",
        "deductible",
        "deductibles",
        "copay",
        "copays",
        "premium",
        "premiums",
        "medicare",
        "medicaid",
        "hmo",
        "ppo",
        "enrollment",
        "subsidy",
        "subsidies",
        "molina",
        "aetna",
        "humana",
        "cigna",
        "unitedhealthcare",
        "blue cross",
    ]
});

/// Adjacent vocabulary that needs a longer utterance to count.
static WEAK_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "doctor",
        "doctors",
        "hospital",
        "hospitals",
        "provider",
        "providers",
        "network",
        "health",
        "dental",
        "vision",
        "prescription",
        "drugs",
        "benefits",
        "cover",
        "covers",
        "covered",
        "county",
        "cost",
        "costs",
        "afford",
        "specialist",
        "compare",
    ]
});

/// Greetings and small talk that mark an utterance off-topic.
static OFF_TOPIC_PHRASES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "hi",
        "hello",
        "hey",
        "good morning",
        "good afternoon",
        "good evening",
        "how are you",
        "what's up",
        "thanks",
        "thank you",
        "bye",
        "goodbye",
        "weather",
        "movie",
        "movies",
        "music",
        "sports",
        "joke",
        "football",
    ]
});

/// Relevance filter over a fixed vocabulary.
///
/// Pure: no allocation beyond tokenization, no I/O, no model calls.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    strong_keywords: Vec<String>,
    weak_keywords: Vec<String>,
    off_topic_phrases: Vec<String>,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self {
            strong_keywords: STRONG_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            weak_keywords: WEAK_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            off_topic_phrases: OFF_TOPIC_PHRASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RelevanceFilter {
    /// Creates a filter with the built-in vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter with a custom vocabulary.
    pub fn with_vocabulary(
        strong_keywords: Vec<String>,
        weak_keywords: Vec<String>,
        off_topic_phrases: Vec<String>,
    ) -> Self {
        Self {
            strong_keywords,
            weak_keywords,
            off_topic_phrases,
        }
    }

    /// Decides whether an utterance should reach the model.
    ///
    /// The rules fire in order; the first that applies wins:
    /// 1. shorter than 2 bytes → reject
    /// 2. entirely digits → accept
    /// 3. a single non-digit character → reject
    /// 4. off-topic phrase: reject short utterances outright, and longer
    ///    ones unless domain vocabulary is also present
    /// 5. strong keyword → accept
    /// 6. weak keyword in an utterance of at least 3 words → accept
    /// 7. at least 5 words → accept
    /// 8. single word without keywords → reject
    /// 9. anything else → reject
    pub fn is_on_topic(&self, utterance: &str) -> bool {
        let trimmed = utterance.trim();

        if trimmed.len() < 2 {
            return false;
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }

        if trimmed.chars().count() == 1 {
            return false;
        }

        let lowered = trimmed.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        let word_count = words.len();

        let has_strong = self.contains_any(&lowered, &words, &self.strong_keywords);
        let has_weak = self.contains_any(&lowered, &words, &self.weak_keywords);

        if self.contains_any(&lowered, &words, &self.off_topic_phrases) {
            if word_count <= 3 {
                return false;
            }
            if !has_strong && !has_weak {
                return false;
            }
        }

        if has_strong {
            return true;
        }

        if has_weak && word_count >= 3 {
            return true;
        }

        if word_count >= 5 {
            return true;
        }

        false
    }

    /// Phrase matching: single-word terms must match a whole word (so
    /// "hi" never fires inside "this"); multi-word terms match as
    /// substrings of the lowercased utterance.
    fn contains_any(&self, lowered: &str, words: &[&str], terms: &[String]) -> bool {
        terms.iter().any(|term| {
            if term.contains(' ') {
                lowered.contains(term.as_str())
            } else {
                words
                    .iter()
                    .any(|w| w.trim_matches(|c: char| !c.is_alphanumeric()) == term)
            }
        })
    }
}
