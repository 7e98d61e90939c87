//! `EngineState`: the per-problem mutable record a `ThinkingEngine` run
//! builds up step by step.

use super::step::ThinkingStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Initializing,
    ProblemAnalysis,
    StrategySelection,
    Execution,
    Conclusion,
    Error,
    Completed,
}

impl Phase {
    /// All transitions are monotonic through the listed order, except
    /// that `Error` is terminal: nothing may follow it, not even
    /// `Completed`.
    pub fn can_transition_to(&self, next: Phase) -> bool {
        if *self == Phase::Error {
            return false;
        }
        if next == Phase::Error {
            return true;
        }
        Self::order(*self) <= Self::order(next)
    }

    fn order(phase: Phase) -> u8 {
        match phase {
            Phase::Initializing => 0,
            Phase::ProblemAnalysis => 1,
            Phase::StrategySelection => 2,
            Phase::Execution => 3,
            Phase::Conclusion => 4,
            Phase::Completed => 5,
            Phase::Error => 255,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub trigger: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressMetrics {
    pub mean_confidence: f32,
    pub mean_coherence: f32,
    pub mean_significance: f32,
    pub mean_complexity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineState {
    pub problem_id: Uuid,
    pub original_problem: String,
    pub processed_problem: String,
    pub problem_type: String,
    pub phase: Phase,
    pub steps: Vec<ThinkingStep>,
    pub current_step_index: usize,
    pub initial_token_budget: usize,
    pub tokens_used: usize,
    pub max_steps: usize,
    pub strategy: String,
    pub model: String,
    pub progress_metrics: ProgressMetrics,
    pub adjustments: Vec<AdjustmentEntry>,
}

impl EngineState {
    pub fn new(
        original_problem: impl Into<String>,
        initial_token_budget: usize,
        max_steps: usize,
        strategy: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let original_problem = original_problem.into();
        Self {
            problem_id: Uuid::new_v4(),
            processed_problem: original_problem.clone(),
            original_problem,
            problem_type: "general".to_string(),
            phase: Phase::Initializing,
            steps: Vec::new(),
            current_step_index: 0,
            initial_token_budget,
            tokens_used: 0,
            max_steps,
            strategy: strategy.into(),
            model: model.into(),
            progress_metrics: ProgressMetrics::default(),
            adjustments: Vec::new(),
        }
    }

    pub fn transition(&mut self, next: Phase) -> Result<(), String> {
        if !self.phase.can_transition_to(next) {
            return Err(format!("illegal phase transition {:?} -> {:?}", self.phase, next));
        }
        self.phase = next;
        Ok(())
    }

    /// Appends a step, accumulating its token cost. Refuses once
    /// `max_steps` has been reached.
    pub fn push_step(&mut self, step: ThinkingStep) -> Result<(), String> {
        if self.steps.len() >= self.max_steps {
            return Err("max_steps reached".to_string());
        }
        self.tokens_used += step.token_count;
        self.current_step_index = self.steps.len();
        self.steps.push(step);
        self.recompute_progress_metrics();
        Ok(())
    }

    /// Raises the token budget, recording the adjustment in the
    /// append-only ledger.
    pub fn adjust_budget(&mut self, new_budget: usize, trigger: impl Into<String>, details: impl Into<String>) {
        self.adjustments.push(AdjustmentEntry {
            timestamp: Utc::now(),
            kind: "budget_increase".to_string(),
            trigger: trigger.into(),
            details: details.into(),
        });
        self.initial_token_budget = self.initial_token_budget.max(new_budget);
    }

    fn recompute_progress_metrics(&mut self) {
        let n = self.steps.len() as f32;
        if n == 0.0 {
            return;
        }
        let mut confidence = 0.0;
        let mut coherence = 0.0;
        let mut significance = 0.0;
        let mut complexity = 0.0;
        for step in &self.steps {
            confidence += step.confidence;
            coherence += step.metrics.coherence;
            significance += step.metrics.significance;
            complexity += step.metrics.complexity;
        }
        self.progress_metrics = ProgressMetrics {
            mean_confidence: confidence / n,
            mean_coherence: coherence / n,
            mean_significance: significance / n,
            mean_complexity: complexity / n,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions_are_monotonic() {
        let mut state = EngineState::new("p", 8192, 10, "standard", "gpt-4o-mini");
        assert!(state.transition(Phase::ProblemAnalysis).is_ok());
        assert!(state.transition(Phase::Initializing).is_err());
    }

    #[test]
    fn test_error_is_terminal() {
        let mut state = EngineState::new("p", 8192, 10, "standard", "gpt-4o-mini");
        state.transition(Phase::Error).unwrap();
        assert!(state.transition(Phase::Completed).is_err());
    }

    #[test]
    fn test_push_step_respects_max_steps() {
        let mut state = EngineState::new("p", 8192, 1, "standard", "gpt-4o-mini");
        assert!(state.push_step(ThinkingStep::new("d", "r", 10)).is_ok());
        assert!(state.push_step(ThinkingStep::new("d2", "r2", 10)).is_err());
    }

    #[test]
    fn test_tokens_used_accumulates() {
        let mut state = EngineState::new("p", 8192, 5, "standard", "gpt-4o-mini");
        state.push_step(ThinkingStep::new("d", "r", 42)).unwrap();
        assert_eq!(state.tokens_used, 42);
    }
}
