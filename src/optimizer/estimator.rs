//! Token estimation: a character/word hybrid heuristic with a per-model
//! learned correction ratio updated by EMA on observed-vs-estimated usage.

use std::collections::HashMap;
use std::sync::RwLock;

/// Smoothing factor for the per-model ratio EMA.
const EMA_ALPHA: f64 = 0.05;

/// Counts maximal runs of whitespace characters in `text`.
fn whitespace_runs(text: &str) -> usize {
    let mut runs = 0;
    let mut in_run = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_run {
                runs += 1;
                in_run = true;
            }
        } else {
            in_run = false;
        }
    }
    runs
}

/// Estimates tokens from raw text and tracks a learned per-model
/// correction ratio.
pub struct TokenEstimator {
    ratios: RwLock<HashMap<String, f64>>,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimator {
    pub fn new() -> Self {
        Self {
            ratios: RwLock::new(HashMap::new()),
        }
    }

    /// `ceil(len/4) + 0.5*special_chars - 0.2*whitespace_runs`, scaled by
    /// the model's learned ratio (default 1.0). Returns 0 for empty text.
    pub fn estimate(&self, text: &str, model_name: Option<&str>) -> usize {
        if text.is_empty() {
            return 0;
        }

        let len = text.chars().count() as f64;
        let special_chars = text
            .chars()
            .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
            .count() as f64;
        let runs = whitespace_runs(text) as f64;

        let base = (len / 4.0).ceil() + 0.5 * special_chars - 0.2 * runs;
        let base = base.max(0.0);

        let ratio = model_name
            .and_then(|m| self.ratios.read().ok().and_then(|r| r.get(m).copied()))
            .unwrap_or(1.0);

        (base * ratio).round().max(0.0) as usize
    }

    /// Updates the per-model ratio toward `observed / estimated` by EMA.
    pub fn observe(&self, model_name: &str, estimated: usize, observed: usize) {
        if estimated == 0 {
            return;
        }
        let sample_ratio = observed as f64 / estimated as f64;
        if let Ok(mut ratios) = self.ratios.write() {
            let entry = ratios.entry(model_name.to_string()).or_insert(1.0);
            *entry = *entry * (1.0 - EMA_ALPHA) + sample_ratio * EMA_ALPHA;
        }
    }

    pub fn ratio_for(&self, model_name: &str) -> f64 {
        self.ratios
            .read()
            .ok()
            .and_then(|r| r.get(model_name).copied())
            .unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero() {
        let est = TokenEstimator::new();
        assert_eq!(est.estimate("", None), 0);
    }

    #[test]
    fn test_plain_text_roughly_len_over_four() {
        let est = TokenEstimator::new();
        let text = "a".repeat(40);
        // no special chars, no whitespace runs
        assert_eq!(est.estimate(&text, None), 10);
    }

    #[test]
    fn test_special_chars_increase_estimate() {
        let est = TokenEstimator::new();
        let plain = est.estimate("aaaa", None);
        let special = est.estimate("a{a}a", None);
        assert!(special > plain);
    }

    #[test]
    fn test_ema_moves_ratio_toward_observed() {
        let est = TokenEstimator::new();
        assert_eq!(est.ratio_for("gpt"), 1.0);
        for _ in 0..200 {
            est.observe("gpt", 100, 120);
        }
        let ratio = est.ratio_for("gpt");
        assert!((ratio - 1.2).abs() < 0.01, "ratio={}", ratio);
    }
}
