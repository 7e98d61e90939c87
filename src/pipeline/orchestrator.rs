//! `PipelineOrchestrator`: executes a fixed, ordered sequence of stages,
//! each against its own provider/model, threading each stage's output
//! into the next stage's input.
//!
//! Exactly one constructor shape is supported: `(stages, options)`, with
//! stages carrying their own provider/model references. Every call to
//! `run` builds its own local state; the orchestrator keeps nothing that
//! would make one request's state visible to another.

use super::stage::{PipelineResult, PipelineStage, StageRecord};
use crate::error::CognitionError;
use crate::providers::{CancellationToken, Message, ModelRequest};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct PipelineOrchestratorOptions {
    /// Overrides the per-stage request timeout; `None` defers to the
    /// stage's provider default.
    pub timeout_ms_per_stage: Option<u64>,
}

/// Outcome of one `run`: the stage records completed so far, plus the
/// failure that ended the run early, if any. `run` itself never panics
/// or propagates an error; a caller inspects `error` to tell a clean
/// finish from an aborted one.
#[derive(Debug, Clone)]
pub struct PipelineRunOutcome {
    pub result: PipelineResult,
    pub error: Option<CognitionError>,
}

pub struct PipelineOrchestrator {
    stages: Vec<PipelineStage>,
    options: PipelineOrchestratorOptions,
}

impl PipelineOrchestrator {
    pub fn new(stages: Vec<PipelineStage>, options: PipelineOrchestratorOptions) -> Self {
        Self { stages, options }
    }

    /// Runs every stage in order, feeding stage `i`'s output text as
    /// stage `i+1`'s input. Aborts at the first stage whose provider
    /// call fails (after that provider's own retry/fallback budget is
    /// exhausted), returning whatever stage records completed.
    pub async fn run(&self, input: &str, cancel: &CancellationToken) -> PipelineRunOutcome {
        let mut stages_completed = Vec::with_capacity(self.stages.len());
        let mut current_input = input.to_string();
        let mut total_tokens = 0usize;

        for (index, stage) in self.stages.iter().enumerate() {
            if cancel.is_cancelled() {
                return PipelineRunOutcome {
                    result: PipelineResult {
                        final_result: current_input,
                        total_tokens,
                        stages: stages_completed,
                    },
                    error: Some(CognitionError::Canceled),
                };
            }

            let request = ModelRequest {
                model_id: stage.model_id.clone(),
                messages: vec![Message::system(stage.system_prompt.clone()), Message::user(current_input.clone())],
                temperature: stage.temperature,
                max_tokens: stage.max_tokens,
                timeout_ms: self.options.timeout_ms_per_stage,
            };

            let started = Instant::now();
            match stage.provider.query(&request, cancel).await {
                Ok(response) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    let text = response.first_text().unwrap_or_default().to_string();
                    total_tokens += response.usage.total;
                    stages_completed.push(StageRecord {
                        stage_name: stage.name.clone(),
                        model_id: stage.model_id.clone(),
                        token_usage: response.usage,
                        result_text: text.clone(),
                        elapsed_ms,
                    });
                    current_input = text;
                }
                Err(err) => {
                    return PipelineRunOutcome {
                        result: PipelineResult {
                            final_result: current_input,
                            total_tokens,
                            stages: stages_completed,
                        },
                        error: Some(CognitionError::PipelineFailed {
                            stage: index,
                            cause: err.to_string(),
                        }),
                    };
                }
            }
        }

        PipelineRunOutcome {
            result: PipelineResult {
                final_result: current_input,
                total_tokens,
                stages: stages_completed,
            },
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::providers::{CancellationSource, Choice, Message as ProviderMessage, ModelResponse, Provider, Role, Usage};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoProvider {
        name: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl Provider for EchoProvider {
        async fn query(&self, req: &ModelRequest, _cancel: &CancellationToken) -> Result<ModelResponse> {
            if self.fail {
                return Err(CognitionError::ServerError("boom".to_string()));
            }
            let user_text = req
                .messages
                .iter()
                .rev()
                .find(|m| matches!(m.role, Role::User))
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(ModelResponse {
                choices: vec![Choice {
                    message: ProviderMessage {
                        role: Role::Assistant,
                        content: format!("[{}] {}", self.name, user_text),
                    },
                }],
                usage: Usage {
                    prompt: 5,
                    completion: 5,
                    total: 10,
                },
                model_id: req.model_id.clone(),
                latency_ms: 1,
            })
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn stage(name: &'static str, fail: bool) -> PipelineStage {
        PipelineStage::new(
            name,
            Arc::new(EchoProvider { name, fail }),
            "m",
            "system prompt",
            0.5,
            100,
        )
    }

    #[tokio::test]
    async fn test_threads_output_into_next_stage_input() {
        let orchestrator = PipelineOrchestrator::new(vec![stage("s1", false), stage("s2", false)], PipelineOrchestratorOptions::default());
        let cancel = CancellationSource::new().token();
        let outcome = orchestrator.run("hello", &cancel).await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.result.stages.len(), 2);
        assert_eq!(outcome.result.final_result, "[s2] [s1] hello");
    }

    #[tokio::test]
    async fn test_total_tokens_sums_stage_usage() {
        let orchestrator = PipelineOrchestrator::new(vec![stage("s1", false), stage("s2", false)], PipelineOrchestratorOptions::default());
        let cancel = CancellationSource::new().token();
        let outcome = orchestrator.run("hello", &cancel).await;
        assert_eq!(outcome.result.total_tokens, 20);
    }

    #[tokio::test]
    async fn test_aborts_with_pipeline_failed_and_keeps_prior_records() {
        let orchestrator = PipelineOrchestrator::new(
            vec![stage("s1", false), stage("s2", true), stage("s3", false)],
            PipelineOrchestratorOptions::default(),
        );
        let cancel = CancellationSource::new().token();
        let outcome = orchestrator.run("hello", &cancel).await;
        assert_eq!(outcome.result.stages.len(), 1);
        match outcome.error {
            Some(CognitionError::PipelineFailed { stage, .. }) => assert_eq!(stage, 1),
            other => panic!("expected PipelineFailed, got {:?}", other),
        }
    }
}
