//! `tree_of_thoughts`: explores a bounded branching tree of candidate
//! reasoning paths, backtracking to the next best unexplored branch when
//! a path is exhausted, and synthesizes the best path at the end.

use crate::thinking::step::ThinkingStep;
use crate::thinking::strategy::{
    baseline_confidence, token_efficiency, RemainingComplexity, StrategyMetrics, StrategyName, ThinkingStrategy,
};

const MIN_DEPTH: usize = 3;
const MAX_DEPTH: usize = 5;
const MIN_BRANCHING: usize = 2;
const MAX_BRANCHING: usize = 3;

/// Deterministic pseudo-evaluation score in [0,1) derived from a branch
/// id, standing in for a model-scored heuristic.
fn evaluate_branch(id: &str) -> f32 {
    let mut hash: u32 = 2166136261;
    for b in id.bytes() {
        hash ^= b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    (hash % 1000) as f32 / 1000.0
}

fn depth_from_id(id: &str) -> usize {
    id.matches('_').count()
}

fn size_from_problem(problem: &str) -> (usize, usize) {
    let len = problem.len();
    let depth = (MIN_DEPTH + len / 200).min(MAX_DEPTH);
    let branching = if len % 2 == 0 { MIN_BRANCHING } else { MAX_BRANCHING };
    (depth, branching)
}

struct Branch {
    id: String,
    evaluation: f32,
}

pub struct TreeOfThoughtsStrategy {
    problem: String,
    max_depth: usize,
    branching: usize,
    frontier: Vec<Branch>,
    explored_count: usize,
    synthesis_emitted: bool,
    best_path_id: Option<String>,
    tokens_spent: usize,
}

impl TreeOfThoughtsStrategy {
    pub fn new() -> Self {
        Self {
            problem: String::new(),
            max_depth: MIN_DEPTH,
            branching: MIN_BRANCHING,
            frontier: Vec::new(),
            explored_count: 0,
            synthesis_emitted: false,
            best_path_id: None,
            tokens_spent: 0,
        }
    }

    fn expected_steps(&self) -> usize {
        // Rough upper bound: one explore step per depth per branch, plus
        // the final synthesis step. Used only to report progress.
        self.max_depth * self.branching + 1
    }
}

impl Default for TreeOfThoughtsStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ThinkingStrategy for TreeOfThoughtsStrategy {
    fn name(&self) -> StrategyName {
        StrategyName::TreeOfThoughts
    }

    fn initialize(&mut self, problem: &str) {
        let (depth, branching) = size_from_problem(problem);
        self.problem = problem.to_string();
        self.max_depth = depth;
        self.branching = branching;
        self.explored_count = 0;
        self.synthesis_emitted = false;
        self.best_path_id = None;
        self.tokens_spent = 0;

        self.frontier = (0..branching)
            .map(|i| {
                let id = format!("root{}", i);
                let evaluation = evaluate_branch(&id);
                Branch { id, evaluation }
            })
            .collect();
    }

    fn next_step(&mut self) -> ThinkingStep {
        if self.frontier.is_empty() {
            self.synthesis_emitted = true;
            let reasoning = format!(
                "Synthesis of best path {} for: {}",
                self.best_path_id.clone().unwrap_or_else(|| "root0".to_string()),
                self.problem
            );
            let token_count = reasoning.len() / 4 + 10;
            self.tokens_spent += token_count;
            let mut step = ThinkingStep::new("synthesis", reasoning, token_count);
            step.confidence = baseline_confidence(1.0, RemainingComplexity::Low);
            let _ = step.set_status(crate::thinking::step::StepStatus::Completed);
            return step;
        }

        // Explore the globally best-scoring unexplored branch; this is
        // what gives us backtracking for free when a subtree is spent.
        let (best_idx, _) = self
            .frontier
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.evaluation.partial_cmp(&b.1.evaluation).unwrap())
            .unwrap();
        let branch = self.frontier.remove(best_idx);
        self.explored_count += 1;

        if self.best_path_id.as_deref().map(|id| evaluate_branch(id) < branch.evaluation).unwrap_or(true) {
            self.best_path_id = Some(branch.id.clone());
        }

        let depth = depth_from_id(&branch.id);
        if depth + 1 < self.max_depth {
            let mut children: Vec<Branch> = (0..self.branching)
                .map(|i| {
                    let id = format!("{}_{}", branch.id, i);
                    let evaluation = evaluate_branch(&id);
                    Branch { id, evaluation }
                })
                .collect();
            self.frontier.append(&mut children);
            self.frontier
                .sort_by(|a, b| b.evaluation.partial_cmp(&a.evaluation).unwrap());
            self.frontier.truncate(self.branching.max(1) * self.max_depth);
        }

        let reasoning = format!(
            "Exploring branch {} (depth {}, evaluation {:.2}) for: {}",
            branch.id, depth, branch.evaluation, self.problem
        );
        let token_count = reasoning.len() / 4 + 10;
        self.tokens_spent += token_count;

        let mut step = ThinkingStep::new(format!("branch:{}", branch.id), reasoning, token_count);
        step.confidence = baseline_confidence(self.progress(), RemainingComplexity::Medium);
        let _ = step.set_status(crate::thinking::step::StepStatus::Completed);
        step
    }

    fn should_continue(&self) -> bool {
        !self.synthesis_emitted
    }

    fn progress(&self) -> f32 {
        if self.synthesis_emitted {
            return 1.0;
        }
        (self.explored_count as f32 / self.expected_steps() as f32).min(0.99)
    }

    fn metrics(&self) -> StrategyMetrics {
        let progress = self.progress();
        StrategyMetrics {
            confidence: baseline_confidence(progress, RemainingComplexity::Medium),
            reasoning: format!(
                "{} branches explored, {} pending, depth<= {}",
                self.explored_count,
                self.frontier.len(),
                self.max_depth
            ),
            alternatives: self.frontier.iter().map(|b| b.id.clone()).collect(),
            token_efficiency: token_efficiency(progress, self.tokens_spent),
            complexity_score: 1.0 - progress,
        }
    }
}
