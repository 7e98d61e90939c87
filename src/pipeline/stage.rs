//! `PipelineStage`/`PipelineResult`: the data model a
//! [`super::orchestrator::PipelineOrchestrator`] executes and reports.

use crate::providers::{Provider, Usage};
use std::sync::Arc;

/// One step of the pipeline: a name, the provider it runs against, and
/// the model parameters for that call.
pub struct PipelineStage {
    pub name: String,
    pub provider: Arc<dyn Provider>,
    pub model_id: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl PipelineStage {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn Provider>,
        model_id: impl Into<String>,
        system_prompt: impl Into<String>,
        temperature: f32,
        max_tokens: usize,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            model_id: model_id.into(),
            system_prompt: system_prompt.into(),
            temperature,
            max_tokens,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageRecord {
    pub stage_name: String,
    pub model_id: String,
    pub token_usage: Usage,
    pub result_text: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineResult {
    pub final_result: String,
    pub total_tokens: usize,
    pub stages: Vec<StageRecord>,
}
