//! The required strategy variants. [`super::strategy::StrategyInstance`]
//! ties them together as a single tagged-variant type.

pub mod chain_of_thought;
pub mod composite;
pub mod fixed_sequence;
pub mod minimal;
pub mod standard;
pub mod strategic;
pub mod tree_of_thoughts;
