//! Pipeline Orchestrator: runs a fixed sequence of provider-backed
//! stages, threading each stage's output into the next stage's input.

pub mod orchestrator;
pub mod stage;

pub use orchestrator::{PipelineOrchestrator, PipelineOrchestratorOptions, PipelineRunOutcome};
pub use stage::{PipelineResult, PipelineStage, StageRecord};
