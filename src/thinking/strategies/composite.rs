//! `composite`: wraps N child strategies behind one of three selection
//! modes. Weights are treated as immutable inputs; a separate feedback
//! channel (running success rate) may modulate selection when enabled,
//! but it never mutates the weights themselves.

use crate::thinking::step::ThinkingStep;
use crate::thinking::strategy::{
    token_efficiency, StrategyInstance, StrategyMetrics, StrategyName, ThinkingStrategy,
};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    Sequential,
    Parallel,
    Weighted,
}

pub struct CompositeStrategy {
    children: Vec<Box<StrategyInstance>>,
    weights: Vec<f32>,
    mode: CompositeMode,
    feedback_enabled: bool,
    /// (successes, attempts) per child; only consulted when feedback is
    /// enabled, and never altered outside `observe_outcome`.
    success_counters: Vec<(u32, u32)>,
    tokens_spent: usize,
}

impl CompositeStrategy {
    pub fn new(children: Vec<StrategyInstance>, weights: Vec<f32>, mode: CompositeMode, feedback_enabled: bool) -> Self {
        let len = children.len();
        Self {
            children: children.into_iter().map(Box::new).collect(),
            weights,
            mode,
            feedback_enabled,
            success_counters: vec![(0, 0); len],
            tokens_spent: 0,
        }
    }

    /// Records whether child `idx`'s most recent step was judged
    /// successful, feeding the weighted mode's running success rate.
    pub fn observe_outcome(&mut self, idx: usize, success: bool) {
        if let Some(counter) = self.success_counters.get_mut(idx) {
            counter.1 += 1;
            if success {
                counter.0 += 1;
            }
        }
    }

    fn success_rate(&self, idx: usize) -> f32 {
        match self.success_counters.get(idx) {
            Some((_, 0)) | None => 1.0,
            Some((s, a)) => *s as f32 / *a as f32,
        }
    }

    fn active_indices(&self) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.should_continue())
            .map(|(i, _)| i)
            .collect()
    }

    fn pick_sequential(&self) -> Option<usize> {
        self.children.iter().position(|c| c.should_continue())
    }

    fn pick_weighted(&self) -> Option<usize> {
        let active = self.active_indices();
        if active.is_empty() {
            return None;
        }
        let effective: Vec<f32> = active
            .iter()
            .map(|&i| {
                let base = self.weights.get(i).copied().unwrap_or(1.0).max(0.0);
                if self.feedback_enabled {
                    base * self.success_rate(i)
                } else {
                    base
                }
            })
            .collect();
        let total: f32 = effective.iter().sum();
        if total <= 0.0 {
            return active.first().copied();
        }
        let mut draw = rand::thread_rng().gen_range(0.0..total);
        for (pos, &idx) in active.iter().enumerate() {
            draw -= effective[pos];
            if draw <= 0.0 {
                return Some(idx);
            }
        }
        active.last().copied()
    }
}

impl ThinkingStrategy for CompositeStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::Composite
    }

    fn initialize(&mut self, problem: &str) {
        for child in &mut self.children {
            child.initialize(problem);
        }
        self.tokens_spent = 0;
    }

    fn next_step(&mut self) -> ThinkingStep {
        match self.mode {
            CompositeMode::Sequential => {
                if let Some(idx) = self.pick_sequential() {
                    let step = self.children[idx].next_step();
                    self.tokens_spent += step.token_count;
                    step
                } else {
                    ThinkingStep::error("composite", "no child able to produce a step")
                }
            }
            CompositeMode::Parallel => {
                let active = self.active_indices();
                if active.is_empty() {
                    return ThinkingStep::error("composite", "no child able to produce a step");
                }
                let mut best: Option<ThinkingStep> = None;
                for idx in active {
                    let candidate = self.children[idx].next_step();
                    self.tokens_spent += candidate.token_count;
                    let better = match &best {
                        None => true,
                        Some(current) => candidate.confidence > current.confidence,
                    };
                    if better {
                        best = Some(candidate);
                    }
                }
                // Falls back to the first candidate if none compared
                // favorably, which `best` already encodes.
                best.expect("active children guarantee at least one candidate")
            }
            CompositeMode::Weighted => {
                if let Some(idx) = self.pick_weighted() {
                    let step = self.children[idx].next_step();
                    self.tokens_spent += step.token_count;
                    step
                } else {
                    ThinkingStep::error("composite", "no child able to produce a step")
                }
            }
        }
    }

    fn should_continue(&self) -> bool {
        self.children.iter().any(|c| c.should_continue())
    }

    fn progress(&self) -> f32 {
        if self.children.is_empty() {
            return 1.0;
        }
        let sum: f32 = self.children.iter().map(|c| c.progress()).sum();
        sum / self.children.len() as f32
    }

    fn metrics(&self) -> StrategyMetrics {
        let progress = self.progress();
        let mut alternatives = Vec::new();
        let mut confidence_sum = 0.0;
        for child in &self.children {
            let m = child.metrics();
            confidence_sum += m.confidence;
            alternatives.extend(m.alternatives);
        }
        let confidence = if self.children.is_empty() {
            0.0
        } else {
            confidence_sum / self.children.len() as f32
        };
        StrategyMetrics {
            confidence,
            reasoning: format!("composite({:?}) over {} children", self.mode, self.children.len()),
            alternatives,
            token_efficiency: token_efficiency(progress, self.tokens_spent),
            complexity_score: 1.0 - progress,
        }
    }
}
