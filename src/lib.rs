//! Cogniweave - a cognitive orchestration engine coordinating multiple
//! LLM providers.
//!
//! - **Token Optimizer**: estimates usage and compresses prompts to fit a
//!   budget, without discarding meaning.
//! - **Ephemeral Cache**: content-addressed, TTL-bounded response cache.
//! - **Model Provider Layer**: a uniform `query` operation over a single
//!   remote endpoint, and a priority/weight-ordered Fallback Provider
//!   that routes across several.
//! - **Thinking Engine & Strategies**: iterative, step-by-step reasoning
//!   driven by a selectable strategy.
//! - **Pipeline Orchestrator**: runs an ordered sequence of provider
//!   stages, threading each stage's output into the next stage's input.
//!
//! These are exposed together through [`tool_surface::ToolSurface`].

pub mod cache;
pub mod config;
pub mod error;
pub mod optimizer;
pub mod pipeline;
pub mod providers;
pub mod thinking;
pub mod tool_surface;
pub mod utils;

pub use cache::EphemeralCache;
pub use config::{EngineConfig, EnvConfig};
pub use error::{CognitionError, Result};
pub use optimizer::{OptimizationOutcome, OptimizeContext, TokenOptimizer};
pub use pipeline::{PipelineOrchestrator, PipelineOrchestratorOptions, PipelineResult, PipelineStage};
pub use providers::{CancellationSource, CancellationToken, FallbackProvider, ModelProvider, Provider};
pub use thinking::{ThinkingEngine, ThinkingEngineOptions, ThinkingModel, ThinkingResult};
pub use tool_surface::ToolSurface;
