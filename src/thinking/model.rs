//! `ThinkingModel`: the descriptor strategies consult for their token and
//! complexity budgets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenLimitBucket {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityBucket {
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingModel {
    pub name: String,
    pub token_limit: TokenLimitBucket,
    pub complexity: ComplexityBucket,
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub feature_tags: Vec<String>,
}

impl ThinkingModel {
    pub fn new(name: impl Into<String>, token_limit: TokenLimitBucket, complexity: ComplexityBucket) -> Self {
        Self {
            name: name.into(),
            token_limit,
            complexity,
            max_tokens: None,
            feature_tags: Vec::new(),
        }
    }

    /// Resolves a numeric token budget: the explicit override if set,
    /// else a default derived from the bucket.
    pub fn effective_max_tokens(&self) -> usize {
        self.max_tokens.unwrap_or(match self.token_limit {
            TokenLimitBucket::VeryLow => 1024,
            TokenLimitBucket::Low => 2048,
            TokenLimitBucket::Moderate => 4096,
            TokenLimitBucket::High => 8192,
            TokenLimitBucket::VeryHigh => 16384,
        })
    }
}

impl Default for ThinkingModel {
    fn default() -> Self {
        Self::new("gpt-4o-mini", TokenLimitBucket::Moderate, ComplexityBucket::Medium)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_max_tokens_falls_back_to_bucket_default() {
        let model = ThinkingModel::new("m", TokenLimitBucket::High, ComplexityBucket::Low);
        assert_eq!(model.effective_max_tokens(), 8192);
    }

    #[test]
    fn test_effective_max_tokens_override_wins() {
        let mut model = ThinkingModel::default();
        model.max_tokens = Some(500);
        assert_eq!(model.effective_max_tokens(), 500);
    }
}
