//! Thinking Engine and Thinking Strategies: iterative, step-by-step
//! reasoning over a problem, driven by a selectable strategy and routed
//! through the provider layer.

pub mod engine;
pub mod metrics;
pub mod model;
pub mod selector;
pub mod state;
pub mod step;
pub mod strategies;
pub mod strategy;

pub use engine::{ThinkingEngine, ThinkingEngineOptions, ThinkingResult};
pub use model::ThinkingModel;
pub use state::{EngineState, Phase};
pub use step::{StepStatus, ThinkingStep};
pub use strategy::{build_strategy, StrategyInstance, StrategyName, ThinkingStrategy};
