//! `minimal`: a fixed 3-step linear sequence.

use super::fixed_sequence::FixedSequenceStrategy;
use crate::thinking::strategy::StrategyName;

const LABELS: &[&str] = &["analysis", "solution", "conclusion"];

pub fn new_minimal_strategy() -> FixedSequenceStrategy {
    FixedSequenceStrategy::new(StrategyName::Minimal, LABELS)
}
