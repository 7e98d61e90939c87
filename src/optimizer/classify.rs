//! Content-type classification and thinking-strategy hint detection used
//! to steer the optimizer's compression strategy selection.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Technical,
    Conversational,
    Narrative,
    Descriptive,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContentType::Technical => "technical",
            ContentType::Conversational => "conversational",
            ContentType::Narrative => "narrative",
            ContentType::Descriptive => "descriptive",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyHint {
    ChainOfThought,
    TreeOfThoughts,
    Deductive,
    Inductive,
    Abductive,
}

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```|`[^`\n]+`").unwrap());
static QUOTED_DIALOGUE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["“][^"”]{3,}["”]\s*,?\s*(she|he|they|I)\s+(said|asked|replied)"#).unwrap());
static PAST_TENSE_NARRATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(once upon a time|yesterday|had been|walked|remembered|realized)\b").unwrap());

static HINT_COT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(chain.of.thought|step.by.step|let'?s think)\b").unwrap());
static HINT_TOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(tree.of.thoughts?|branch(ing)?\s+(paths?|options?)|explore\s+(multiple\s+)?(paths|branches))\b").unwrap());
static HINT_DEDUCTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(deductive|therefore|it follows that|necessarily)\b").unwrap());
static HINT_INDUCTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(inductive|generaliz(e|ation)|based on (the )?pattern)\b").unwrap());
static HINT_ABDUCTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(abductive|best explanation|most likely explanation|hypothesi[sz])\b").unwrap());

/// Classifies `text` into one of the four content buckets by pattern
/// match; falls back to `Descriptive` when nothing matches.
pub fn classify_content(text: &str) -> ContentType {
    if CODE_FENCE.is_match(text) {
        return ContentType::Technical;
    }
    if QUOTED_DIALOGUE.is_match(text) {
        return ContentType::Conversational;
    }
    if PAST_TENSE_NARRATIVE.is_match(text) {
        return ContentType::Narrative;
    }
    ContentType::Descriptive
}

/// Detects a thinking-strategy hint embedded in `text`, `None` if absent.
pub fn detect_strategy_hint(text: &str) -> Option<StrategyHint> {
    if HINT_COT.is_match(text) {
        Some(StrategyHint::ChainOfThought)
    } else if HINT_TOT.is_match(text) {
        Some(StrategyHint::TreeOfThoughts)
    } else if HINT_DEDUCTIVE.is_match(text) {
        Some(StrategyHint::Deductive)
    } else if HINT_INDUCTIVE.is_match(text) {
        Some(StrategyHint::Inductive)
    } else if HINT_ABDUCTIVE.is_match(text) {
        Some(StrategyHint::Abductive)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_technical() {
        let text = "Here is a snippet:\n```rust\nfn main() {}\n```";
        assert_eq!(classify_content(text), ContentType::Technical);
    }

    #[test]
    fn test_classify_narrative() {
        let text = "Once upon a time, she walked through the forest.";
        assert_eq!(classify_content(text), ContentType::Narrative);
    }

    #[test]
    fn test_classify_default_descriptive() {
        let text = "The quarterly report summarizes revenue growth.";
        assert_eq!(classify_content(text), ContentType::Descriptive);
    }

    #[test]
    fn test_detect_hint_chain_of_thought() {
        assert_eq!(
            detect_strategy_hint("Let's think step by step about this."),
            Some(StrategyHint::ChainOfThought)
        );
    }

    #[test]
    fn test_detect_hint_none() {
        assert_eq!(detect_strategy_hint("A plain sentence."), None);
    }
}
