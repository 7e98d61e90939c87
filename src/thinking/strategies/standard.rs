//! `standard`: a fixed 5-step linear sequence.

use super::fixed_sequence::FixedSequenceStrategy;
use crate::thinking::strategy::StrategyName;

const LABELS: &[&str] = &["analysis", "components", "approaches", "architecture", "implementation"];

pub fn new_standard_strategy() -> FixedSequenceStrategy {
    FixedSequenceStrategy::new(StrategyName::Standard, LABELS)
}
