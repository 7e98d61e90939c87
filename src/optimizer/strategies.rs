//! Strategy selection and deterministic text compression for the token
//! optimizer.

use crate::optimizer::classify::{ContentType, StrategyHint};
use once_cell::sync::Lazy;
use regex::Regex;

/// Severe reduction threshold: anything above favors aggressive
/// concept-level extraction over sentence pruning.
const SEVERE_RATIO: f32 = 0.5;
/// Moderate reduction threshold.
const MODERATE_RATIO: f32 = 0.3;

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());
static KEYWORD_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(important|must|critical|key|note|therefore|because|conclusion)\b").unwrap());
static REDUNDANT_CONNECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(in other words|that is to say|as a matter of fact|needless to say)\b,?\s*").unwrap());

/// Names the compression approach a given `optimize()` call used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    None,
    ConceptExtraction,
    TechnicalCompression,
    ConversationalCompression,
    NarrativeCompression,
    DescriptiveCompression,
    LengthReduction,
    CotStepCompression,
    TotBranchPruning,
    DeductiveCoreLogic,
    InductivePatternSummary,
    AbductiveBestExplanation,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::None => "none",
            Strategy::ConceptExtraction => "concept_extraction",
            Strategy::TechnicalCompression => "technical_compression",
            Strategy::ConversationalCompression => "conversational_compression",
            Strategy::NarrativeCompression => "narrative_compression",
            Strategy::DescriptiveCompression => "descriptive_compression",
            Strategy::LengthReduction => "length_reduction",
            Strategy::CotStepCompression => "cot_step_compression",
            Strategy::TotBranchPruning => "tot_branch_pruning",
            Strategy::DeductiveCoreLogic => "deductive_core_logic",
            Strategy::InductivePatternSummary => "inductive_pattern_summary",
            Strategy::AbductiveBestExplanation => "abductive_best_explanation",
        }
    }
}

/// Selects a strategy by branching on reduction ratio, content type, and
/// an optional thinking-strategy hint (hints take priority).
pub fn select_strategy(
    reduction_ratio: f32,
    content_type: ContentType,
    hint: Option<StrategyHint>,
) -> Strategy {
    if let Some(hint) = hint {
        return match hint {
            StrategyHint::ChainOfThought => Strategy::CotStepCompression,
            StrategyHint::TreeOfThoughts => Strategy::TotBranchPruning,
            StrategyHint::Deductive => Strategy::DeductiveCoreLogic,
            StrategyHint::Inductive => Strategy::InductivePatternSummary,
            StrategyHint::Abductive => Strategy::AbductiveBestExplanation,
        };
    }

    if reduction_ratio > SEVERE_RATIO {
        return Strategy::ConceptExtraction;
    }
    if reduction_ratio >= MODERATE_RATIO {
        return match content_type {
            ContentType::Technical => Strategy::TechnicalCompression,
            ContentType::Conversational => Strategy::ConversationalCompression,
            ContentType::Narrative => Strategy::NarrativeCompression,
            ContentType::Descriptive => Strategy::DescriptiveCompression,
        };
    }
    Strategy::LengthReduction
}

/// Splits `text` into sentences on `.`, `!`, `?` boundaries, keeping
/// trailing punctuation attached.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let end = i + c.len_utf8();
            let candidate = text[start..end].trim();
            if !candidate.is_empty() {
                sentences.push(candidate);
            }
            start = end;
            let _ = bytes;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Scores a sentence by position (first/last bonus), keyword markers,
/// numeric content, and domain-term density.
fn score_sentence(sentence: &str, index: usize, total: usize, domain_terms: &[&str]) -> f32 {
    let mut score = 1.0;
    if index == 0 || index + 1 == total {
        score += 2.0;
    }
    if KEYWORD_MARKER.is_match(sentence) {
        score += 1.5;
    }
    if NUMERIC.is_match(sentence) {
        score += 1.0;
    }
    let lower = sentence.to_lowercase();
    let domain_hits = domain_terms.iter().filter(|t| lower.contains(**t)).count();
    score += domain_hits as f32 * 0.5;
    score
}

/// Collapses known redundant connective phrases.
fn collapse_connectives(text: &str) -> String {
    REDUNDANT_CONNECTIVE.replace_all(text, "").to_string()
}

/// Applies sentence-level pruning: keeps the top-scoring fraction of
/// sentences (always including first and last), always returning at
/// least one sentence when the input is non-empty.
pub fn compress_by_sentence_score(text: &str, keep_ratio: f32, domain_terms: &[&str]) -> String {
    let collapsed = collapse_connectives(text);
    let sentences = split_sentences(&collapsed);
    if sentences.len() <= 1 {
        return collapsed.trim().to_string();
    }

    let keep_count = ((sentences.len() as f32 * keep_ratio).ceil() as usize)
        .max(1)
        .min(sentences.len());

    let mut scored: Vec<(usize, f32)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (i, score_sentence(s, i, sentences.len(), domain_terms)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept_indices: Vec<usize> = scored.into_iter().take(keep_count).map(|(i, _)| i).collect();
    kept_indices.sort_unstable();

    kept_indices
        .into_iter()
        .map(|i| sentences[i])
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::classify::ContentType;

    #[test]
    fn test_select_strategy_severe() {
        let s = select_strategy(0.6, ContentType::Descriptive, None);
        assert_eq!(s, Strategy::ConceptExtraction);
    }

    #[test]
    fn test_select_strategy_moderate_technical() {
        let s = select_strategy(0.4, ContentType::Technical, None);
        assert_eq!(s, Strategy::TechnicalCompression);
    }

    #[test]
    fn test_select_strategy_mild() {
        let s = select_strategy(0.1, ContentType::Narrative, None);
        assert_eq!(s, Strategy::LengthReduction);
    }

    #[test]
    fn test_select_strategy_hint_overrides_ratio() {
        let s = select_strategy(0.9, ContentType::Technical, Some(StrategyHint::Deductive));
        assert_eq!(s, Strategy::DeductiveCoreLogic);
    }

    #[test]
    fn test_compress_keeps_first_and_last() {
        let text = "First sentence here. Middle filler sentence. Another filler one. Last important conclusion.";
        let out = compress_by_sentence_score(text, 0.5, &[]);
        assert!(out.starts_with("First sentence"));
        assert!(out.ends_with("conclusion."));
    }

    #[test]
    fn test_compress_single_sentence_unchanged() {
        let text = "Only one sentence here.";
        assert_eq!(compress_by_sentence_score(text, 0.1, &[]), text);
    }

    #[test]
    fn test_collapse_connectives() {
        let text = "It works. In other words, it functions correctly.";
        let collapsed = collapse_connectives(text);
        assert!(!collapsed.to_lowercase().contains("in other words"));
    }
}
