//! Configuration surface consumed by the engine and orchestrator
//!
//! The core never loads or parses on-disk configuration itself -- that is
//! the job of the external tool surface -- but it defines the shape of the
//! recognized options and resolves the handful of environment variables
//! it is allowed to read directly.

use crate::error::{CognitionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Required for any remote provider call.
pub const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
/// Enables running-success-rate modulation in `composite` weighted mode.
pub const ENV_STRATEGY_FEEDBACK_ENABLED: &str = "STRATEGY_FEEDBACK_ENABLED";
/// Overrides the data root under which `cache/`, `thinking/`, etc. live.
pub const ENV_DB_DIR: &str = "MCP_DB_DIR";
/// Overrides `token_history/token_metrics.json`.
pub const ENV_TOKEN_HISTORY_PATH: &str = "MCP_TOKEN_HISTORY_PATH";

/// One entry of `preprocessingPipeline.pipelineSteps[]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStepConfig {
    pub name: String,
    pub service: String,
    pub priority: i32,
}

/// `preprocessingPipeline` recognized option block.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PreprocessingPipelineConfig {
    pub enabled: bool,
    #[serde(default)]
    pub pipeline_steps: Vec<PipelineStepConfig>,
}

/// Per-service model parameters (`{model, temperature, maxTokens, topP?}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceModelConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    #[serde(default)]
    pub top_p: Option<f32>,
}

/// Recognized engine-wide configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub default_model: String,
    pub max_steps_per_strategy: usize,
    pub token_budget: usize,
    pub optimization_threshold: f32,
    #[serde(default)]
    pub preprocessing_pipeline: PreprocessingPipelineConfig,
    #[serde(default)]
    pub services: HashMap<String, ServiceModelConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_model: "gpt-4o-mini".to_string(),
            max_steps_per_strategy: 10,
            token_budget: 8192,
            optimization_threshold: 0.3,
            preprocessing_pipeline: PreprocessingPipelineConfig::default(),
            services: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Validate the subset of invariants the core relies on. The rest of
    /// the option surface is opaque passthrough to callers.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps_per_strategy == 0 {
            return Err(CognitionError::Config(
                "maxStepsPerStrategy must be >= 1".to_string(),
            ));
        }
        if self.optimization_threshold <= 0.0 || self.optimization_threshold > 1.0 {
            return Err(CognitionError::Config(
                "optimizationThreshold must be in (0,1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolves the environment variables and data-root layout the core reads
/// directly, independent of any config-file loader.
pub struct EnvConfig;

impl EnvConfig {
    /// `OPENROUTER_API_KEY`, required before any remote call is attempted.
    pub fn api_key() -> Result<String> {
        env::var(ENV_OPENROUTER_API_KEY)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CognitionError::Config(format!("{} not set", ENV_OPENROUTER_API_KEY)))
    }

    pub fn strategy_feedback_enabled() -> bool {
        env::var(ENV_STRATEGY_FEEDBACK_ENABLED)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false)
    }

    /// Resolves the data root: `MCP_DB_DIR` if set, else a platform data
    /// directory, else `./.cogniweave`.
    pub fn data_root() -> PathBuf {
        if let Ok(dir) = env::var(ENV_DB_DIR) {
            return PathBuf::from(dir);
        }
        if let Some(dirs) = directories::ProjectDirs::from("dev", "cogniweave", "cogniweave") {
            return dirs.data_dir().to_path_buf();
        }
        PathBuf::from(".cogniweave")
    }

    /// Resolves `token_history/token_metrics.json`, honoring the override.
    pub fn token_history_path() -> PathBuf {
        if let Ok(path) = env::var(ENV_TOKEN_HISTORY_PATH) {
            return PathBuf::from(path);
        }
        Self::data_root()
            .join("token_history")
            .join("token_metrics.json")
    }

    pub fn cache_dir() -> PathBuf {
        Self::data_root().join("cache")
    }

    pub fn thinking_dir() -> PathBuf {
        Self::data_root().join("thinking")
    }

    pub fn optimization_dir() -> PathBuf {
        Self::data_root().join("optimization")
    }
}
