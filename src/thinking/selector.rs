//! `ReasoningStrategySelector`: picks which strategy handles a problem.
//!
//! Pluggable so callers can supply a smarter classifier later; the
//! default is a keyword match over the problem text, falling back to
//! `chain_of_thought` when nothing matches.

use super::strategy::StrategyName;
use once_cell::sync::Lazy;
use regex::Regex;

static TREE_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(explore options|multiple approaches|branch|alternatives?)\b").unwrap());
static STRATEGIC_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(plan|roadmap|strategy|phased)\b").unwrap());
static MINIMAL_KEYWORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(quick|brief|simple)\b").unwrap());
static STANDARD_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(design|architecture|implement|build)\b").unwrap());

pub trait ReasoningStrategySelector: Send + Sync {
    fn select(&self, problem: &str) -> StrategyName;
}

/// Keyword-based default selector.
pub struct KeywordStrategySelector;

impl ReasoningStrategySelector for KeywordStrategySelector {
    fn select(&self, problem: &str) -> StrategyName {
        if TREE_KEYWORDS.is_match(problem) {
            StrategyName::TreeOfThoughts
        } else if STRATEGIC_KEYWORDS.is_match(problem) {
            StrategyName::Strategic
        } else if MINIMAL_KEYWORDS.is_match(problem) {
            StrategyName::Minimal
        } else if STANDARD_KEYWORDS.is_match(problem) {
            StrategyName::Standard
        } else {
            StrategyName::ChainOfThought
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_keywords_select_tree_of_thoughts() {
        let selector = KeywordStrategySelector;
        assert_eq!(
            selector.select("Let's explore options for this design"),
            StrategyName::TreeOfThoughts
        );
    }

    #[test]
    fn test_default_falls_back_to_chain_of_thought() {
        let selector = KeywordStrategySelector;
        assert_eq!(selector.select("What color is the sky"), StrategyName::ChainOfThought);
    }
}
