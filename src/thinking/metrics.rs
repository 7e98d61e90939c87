//! Key-term extraction and Jaccard-overlap metrics used to score each
//! step's coherence, significance, and complexity.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "that", "this", "with", "from", "have", "has", "had", "not", "are",
        "was", "were", "but", "its", "into", "than", "then", "them", "they", "you", "your",
        "our", "their", "which", "what", "when", "where", "will", "would", "could", "should",
        "about", "also", "can", "all", "any", "each", "more", "some", "such", "only", "out",
        "over", "per", "via",
    ]
    .into_iter()
    .collect()
});

/// Lowercases, strips punctuation, drops tokens of length ≤2 and
/// stopwords, and returns the remaining terms as a set.
pub fn key_terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(w.as_str()))
        .collect()
}

/// |A∩B| / |A∪B|; 1.0 if both sets are empty, 0.0 if only one is.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Mean coherence of `reasoning` against every prior step's reasoning
/// text; 1.0 when there are no previous steps.
pub fn coherence(reasoning: &str, previous_reasonings: &[&str]) -> f32 {
    if previous_reasonings.is_empty() {
        return 1.0;
    }
    let terms = key_terms(reasoning);
    let sum: f32 = previous_reasonings
        .iter()
        .map(|prev| jaccard(&terms, &key_terms(prev)))
        .sum();
    sum / previous_reasonings.len() as f32
}

pub fn significance(reasoning: &str, problem: &str) -> f32 {
    let overlap = jaccard(&key_terms(reasoning), &key_terms(problem));
    let length_component = (reasoning.len() as f32 / 500.0).min(1.0);
    (0.7 * overlap + 0.3 * length_component).clamp(0.0, 1.0)
}

pub fn complexity(reasoning: &str, challenge_count: usize, concept_count: usize, confidence: f32) -> f32 {
    let length_component = (reasoning.len() as f32 / 100.0).min(1.0);
    let mean = (length_component
        + 0.2 * challenge_count as f32
        + 0.1 * concept_count as f32
        + (1.0 - confidence))
        / 4.0;
    mean.clamp(0.0, 1.0)
}
