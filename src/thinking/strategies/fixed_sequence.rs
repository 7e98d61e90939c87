//! Shared machinery for the three strategies that are just a fixed,
//! ordered label sequence walked to completion: `standard`, `minimal`,
//! and `strategic`.

use crate::thinking::step::ThinkingStep;
use crate::thinking::strategy::{baseline_confidence, token_efficiency, RemainingComplexity, StrategyMetrics, ThinkingStrategy};
use crate::thinking::strategy::StrategyName;

pub struct FixedSequenceStrategy {
    name: StrategyName,
    labels: &'static [&'static str],
    problem: String,
    produced: usize,
    tokens_spent: usize,
}

impl FixedSequenceStrategy {
    pub fn new(name: StrategyName, labels: &'static [&'static str]) -> Self {
        Self {
            name,
            labels,
            problem: String::new(),
            produced: 0,
            tokens_spent: 0,
        }
    }
}

impl ThinkingStrategy for FixedSequenceStrategy {
    fn name(&self) -> StrategyName {
        self.name
    }

    fn initialize(&mut self, problem: &str) {
        self.problem = problem.to_string();
        self.produced = 0;
        self.tokens_spent = 0;
    }

    fn next_step(&mut self) -> ThinkingStep {
        let label = self.labels.get(self.produced).copied().unwrap_or("conclusion");
        let reasoning = format!("{} phase for: {}", label, self.problem);
        let token_count = reasoning.len() / 4 + 10;
        self.tokens_spent += token_count;
        self.produced += 1;

        let remaining = if self.produced >= self.labels.len() {
            RemainingComplexity::Low
        } else if self.produced * 2 >= self.labels.len() {
            RemainingComplexity::Medium
        } else {
            RemainingComplexity::High
        };

        let mut step = ThinkingStep::new(label, reasoning, token_count);
        step.confidence = baseline_confidence(self.progress(), remaining);
        let _ = step.set_status(crate::thinking::step::StepStatus::Completed);
        step
    }

    fn should_continue(&self) -> bool {
        self.produced < self.labels.len()
    }

    fn progress(&self) -> f32 {
        if self.labels.is_empty() {
            return 1.0;
        }
        (self.produced as f32 / self.labels.len() as f32).min(1.0)
    }

    fn metrics(&self) -> StrategyMetrics {
        let progress = self.progress();
        StrategyMetrics {
            confidence: baseline_confidence(progress, RemainingComplexity::Medium),
            reasoning: format!("{} of {} steps complete", self.produced, self.labels.len()),
            alternatives: Vec::new(),
            token_efficiency: token_efficiency(progress, self.tokens_spent),
            complexity_score: 1.0 - progress,
        }
    }
}
