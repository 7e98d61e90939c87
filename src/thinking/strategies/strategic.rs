//! `strategic`: a five-phase cycle, terminal once `validate` is emitted.

use super::fixed_sequence::FixedSequenceStrategy;
use crate::thinking::strategy::StrategyName;

const LABELS: &[&str] = &["analyze", "decompose", "plan", "execute", "validate"];

pub fn new_strategic_strategy() -> FixedSequenceStrategy {
    FixedSequenceStrategy::new(StrategyName::Strategic, LABELS)
}
