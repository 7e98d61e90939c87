//! `chain_of_thought`: a bounded run of intermediate thoughts (4-8,
//! scaled to problem size) followed by a single conclusion step.

use crate::thinking::step::ThinkingStep;
use crate::thinking::strategy::{
    baseline_confidence, token_efficiency, RemainingComplexity, StrategyMetrics, StrategyName, ThinkingStrategy,
};

const MIN_THOUGHTS: usize = 4;
const MAX_THOUGHTS: usize = 8;

fn thought_count_for(problem: &str) -> usize {
    let estimated_tokens = problem.len() / 4;
    (MIN_THOUGHTS + estimated_tokens / 50).min(MAX_THOUGHTS)
}

pub struct ChainOfThoughtStrategy {
    problem: String,
    thought_count: usize,
    emitted: usize,
    conclusion_emitted: bool,
    tokens_spent: usize,
}

impl ChainOfThoughtStrategy {
    pub fn new() -> Self {
        Self {
            problem: String::new(),
            thought_count: MIN_THOUGHTS,
            emitted: 0,
            conclusion_emitted: false,
            tokens_spent: 0,
        }
    }
}

impl Default for ChainOfThoughtStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ThinkingStrategy for ChainOfThoughtStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::ChainOfThought
    }

    fn initialize(&mut self, problem: &str) {
        self.problem = problem.to_string();
        self.thought_count = thought_count_for(problem);
        self.emitted = 0;
        self.conclusion_emitted = false;
        self.tokens_spent = 0;
    }

    fn next_step(&mut self) -> ThinkingStep {
        let (description, reasoning, remaining) = if self.emitted < self.thought_count {
            self.emitted += 1;
            (
                format!("thought {}", self.emitted),
                format!("Intermediate thought {} on: {}", self.emitted, self.problem),
                RemainingComplexity::High,
            )
        } else {
            self.conclusion_emitted = true;
            (
                "conclusion".to_string(),
                format!("Conclusion synthesizing {} thoughts on: {}", self.thought_count, self.problem),
                RemainingComplexity::Low,
            )
        };

        let token_count = reasoning.len() / 4 + 10;
        self.tokens_spent += token_count;

        let mut step = ThinkingStep::new(description, reasoning, token_count);
        step.confidence = baseline_confidence(self.progress(), remaining);
        let _ = step.set_status(crate::thinking::step::StepStatus::Completed);
        step
    }

    fn should_continue(&self) -> bool {
        !self.conclusion_emitted
    }

    fn progress(&self) -> f32 {
        if self.conclusion_emitted {
            return 1.0;
        }
        (self.emitted as f32 / (self.thought_count + 1) as f32).min(0.99)
    }

    fn metrics(&self) -> StrategyMetrics {
        let progress = self.progress();
        StrategyMetrics {
            confidence: baseline_confidence(progress, RemainingComplexity::Medium),
            reasoning: format!("{}/{} thoughts emitted, conclusion={}", self.emitted, self.thought_count, self.conclusion_emitted),
            alternatives: Vec::new(),
            token_efficiency: token_efficiency(progress, self.tokens_spent),
            complexity_score: 1.0 - progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thought_count_bounded() {
        let short = thought_count_for("short problem");
        assert!((MIN_THOUGHTS..=MAX_THOUGHTS).contains(&short));
        let long = thought_count_for(&"word ".repeat(500));
        assert_eq!(long, MAX_THOUGHTS);
    }

    #[test]
    fn test_terminal_after_conclusion() {
        let mut strategy = ChainOfThoughtStrategy::new();
        strategy.initialize("a short problem");
        while strategy.should_continue() {
            strategy.next_step();
        }
        assert!(!strategy.should_continue());
    }

    #[test]
    fn test_last_step_is_conclusion() {
        let mut strategy = ChainOfThoughtStrategy::new();
        strategy.initialize("a short problem");
        let mut last = strategy.next_step();
        while strategy.should_continue() {
            last = strategy.next_step();
        }
        assert_eq!(last.description, "conclusion");
    }
}
