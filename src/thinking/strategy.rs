//! Shared strategy vocabulary: the `ThinkingStrategy` trait every step
//! generator implements, and the baseline confidence/efficiency formulas
//! subtypes may override.

use super::step::ThinkingStep;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyName {
    Standard,
    Minimal,
    Strategic,
    ChainOfThought,
    TreeOfThoughts,
    Composite,
}

impl StrategyName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::Standard => "standard",
            StrategyName::Minimal => "minimal",
            StrategyName::Strategic => "strategic",
            StrategyName::ChainOfThought => "chain_of_thought",
            StrategyName::TreeOfThoughts => "tree_of_thoughts",
            StrategyName::Composite => "composite",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyMetrics {
    pub confidence: f32,
    pub reasoning: String,
    pub alternatives: Vec<String>,
    pub token_efficiency: f32,
    pub complexity_score: f32,
}

/// Remaining-complexity bucket used by the baseline confidence formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingComplexity {
    Low,
    Medium,
    High,
}

impl RemainingComplexity {
    fn bonus(self) -> f32 {
        match self {
            RemainingComplexity::Low => 0.3,
            RemainingComplexity::Medium => 0.2,
            RemainingComplexity::High => 0.1,
        }
    }
}

/// `clamp(progress*0.7 + complexityBonus, 0, 0.95)`.
pub fn baseline_confidence(progress: f32, remaining: RemainingComplexity) -> f32 {
    (progress * 0.7 + remaining.bonus()).clamp(0.0, 0.95)
}

/// `progress / (total_tokens / 1000)`, 0 when no tokens have been spent
/// yet (nothing to be inefficient about).
pub fn token_efficiency(progress: f32, total_tokens: usize) -> f32 {
    if total_tokens == 0 {
        return 0.0;
    }
    progress / (total_tokens as f32 / 1000.0)
}

/// A finite step generator: initialize once per problem, then pull steps
/// until `should_continue` reports false.
pub trait ThinkingStrategy: Send {
    fn name(&self) -> StrategyName;
    fn initialize(&mut self, problem: &str);
    fn next_step(&mut self) -> ThinkingStep;
    fn should_continue(&self) -> bool;
    fn progress(&self) -> f32;
    fn metrics(&self) -> StrategyMetrics;
}

/// The finite family of step generators, tagged by kind instead of
/// dispatched through a class hierarchy. `Composite` nests further
/// instances of this same enum as its children.
pub enum StrategyInstance {
    Standard(super::strategies::fixed_sequence::FixedSequenceStrategy),
    Minimal(super::strategies::fixed_sequence::FixedSequenceStrategy),
    Strategic(super::strategies::fixed_sequence::FixedSequenceStrategy),
    ChainOfThought(super::strategies::chain_of_thought::ChainOfThoughtStrategy),
    TreeOfThoughts(super::strategies::tree_of_thoughts::TreeOfThoughtsStrategy),
    Composite(super::strategies::composite::CompositeStrategy),
}

impl ThinkingStrategy for StrategyInstance {
    fn name(&self) -> StrategyName {
        match self {
            StrategyInstance::Standard(_) => StrategyName::Standard,
            StrategyInstance::Minimal(_) => StrategyName::Minimal,
            StrategyInstance::Strategic(_) => StrategyName::Strategic,
            StrategyInstance::ChainOfThought(_) => StrategyName::ChainOfThought,
            StrategyInstance::TreeOfThoughts(_) => StrategyName::TreeOfThoughts,
            StrategyInstance::Composite(_) => StrategyName::Composite,
        }
    }

    fn initialize(&mut self, problem: &str) {
        match self {
            StrategyInstance::Standard(s) | StrategyInstance::Minimal(s) | StrategyInstance::Strategic(s) => {
                s.initialize(problem)
            }
            StrategyInstance::ChainOfThought(s) => s.initialize(problem),
            StrategyInstance::TreeOfThoughts(s) => s.initialize(problem),
            StrategyInstance::Composite(s) => s.initialize(problem),
        }
    }

    fn next_step(&mut self) -> ThinkingStep {
        match self {
            StrategyInstance::Standard(s) | StrategyInstance::Minimal(s) | StrategyInstance::Strategic(s) => {
                s.next_step()
            }
            StrategyInstance::ChainOfThought(s) => s.next_step(),
            StrategyInstance::TreeOfThoughts(s) => s.next_step(),
            StrategyInstance::Composite(s) => s.next_step(),
        }
    }

    fn should_continue(&self) -> bool {
        match self {
            StrategyInstance::Standard(s) | StrategyInstance::Minimal(s) | StrategyInstance::Strategic(s) => {
                s.should_continue()
            }
            StrategyInstance::ChainOfThought(s) => s.should_continue(),
            StrategyInstance::TreeOfThoughts(s) => s.should_continue(),
            StrategyInstance::Composite(s) => s.should_continue(),
        }
    }

    fn progress(&self) -> f32 {
        match self {
            StrategyInstance::Standard(s) | StrategyInstance::Minimal(s) | StrategyInstance::Strategic(s) => {
                s.progress()
            }
            StrategyInstance::ChainOfThought(s) => s.progress(),
            StrategyInstance::TreeOfThoughts(s) => s.progress(),
            StrategyInstance::Composite(s) => s.progress(),
        }
    }

    fn metrics(&self) -> StrategyMetrics {
        match self {
            StrategyInstance::Standard(s) | StrategyInstance::Minimal(s) | StrategyInstance::Strategic(s) => {
                s.metrics()
            }
            StrategyInstance::ChainOfThought(s) => s.metrics(),
            StrategyInstance::TreeOfThoughts(s) => s.metrics(),
            StrategyInstance::Composite(s) => s.metrics(),
        }
    }
}

/// Builds the named strategy with its default configuration. `Composite`
/// has no meaningful default and is constructed directly via
/// [`super::strategies::composite::CompositeStrategy::new`].
pub fn build_strategy(name: StrategyName) -> Option<StrategyInstance> {
    match name {
        StrategyName::Standard => Some(StrategyInstance::Standard(super::strategies::standard::new_standard_strategy())),
        StrategyName::Minimal => Some(StrategyInstance::Minimal(super::strategies::minimal::new_minimal_strategy())),
        StrategyName::Strategic => Some(StrategyInstance::Strategic(super::strategies::strategic::new_strategic_strategy())),
        StrategyName::ChainOfThought => Some(StrategyInstance::ChainOfThought(
            super::strategies::chain_of_thought::ChainOfThoughtStrategy::new(),
        )),
        StrategyName::TreeOfThoughts => Some(StrategyInstance::TreeOfThoughts(
            super::strategies::tree_of_thoughts::TreeOfThoughtsStrategy::new(),
        )),
        StrategyName::Composite => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_confidence_clamped() {
        assert!(baseline_confidence(2.0, RemainingComplexity::Low) <= 0.95);
        assert!(baseline_confidence(-1.0, RemainingComplexity::High) >= 0.0);
    }

    #[test]
    fn test_token_efficiency_zero_tokens() {
        assert_eq!(token_efficiency(0.5, 0), 0.0);
    }

    #[test]
    fn test_token_efficiency_scales_with_progress() {
        assert_eq!(token_efficiency(0.5, 1000), 0.5);
    }

    #[test]
    fn test_build_strategy_runs_to_completion() {
        let mut strategy = build_strategy(StrategyName::Minimal).unwrap();
        strategy.initialize("a problem");
        let mut guard = 0;
        while strategy.should_continue() && guard < 20 {
            strategy.next_step();
            guard += 1;
        }
        assert!(!strategy.should_continue());
    }

    #[test]
    fn test_build_strategy_composite_is_none() {
        assert!(build_strategy(StrategyName::Composite).is_none());
    }
}
