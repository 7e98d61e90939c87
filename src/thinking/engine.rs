//! `ThinkingEngine`: drives the iterative step loop for a problem,
//! routing each step's LLM call through a [`Provider`] (ordinarily a
//! [`crate::providers::fallback::FallbackProvider`]) and tracking
//! per-step metrics on [`EngineState`].

use super::metrics::{coherence, complexity, significance};
use super::model::ThinkingModel;
use super::selector::{KeywordStrategySelector, ReasoningStrategySelector};
use super::state::{AdjustmentEntry, EngineState, Phase, ProgressMetrics};
use super::step::{StepStatus, ThinkingStep};
use super::strategy::StrategyName;
use crate::optimizer::{OptimizationOutcome, OptimizeContext, TokenOptimizer};
use crate::providers::{CancellationToken, Message, ModelRequest, Provider, Usage};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

const DEFAULT_MAX_STEPS: usize = 10;
const DEFAULT_TOKEN_BUDGET: usize = 8192;
const DEFAULT_STEP_TOKEN_CAP: usize = 1000;
const CONTEXT_WINDOW: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct ThinkingEngineOptions {
    pub optimize_tokens: bool,
    pub max_steps: Option<usize>,
    pub per_step_token_cap: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ThinkingResult {
    pub steps: Vec<ThinkingStep>,
    pub reasoning: Vec<String>,
    pub token_usage: Usage,
    pub execution_time_ms: u64,
    pub state_metrics: ProgressMetrics,
    pub optimization: Option<OptimizationOutcome>,
    /// Final phase the run settled in (`Completed` or `Error`).
    pub phase: Phase,
    pub adjustments: Vec<AdjustmentEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepResponse {
    description: Option<String>,
    reasoning: Option<String>,
    #[serde(default)]
    insights: Vec<String>,
    should_continue: Option<bool>,
    confidence: Option<f32>,
    #[serde(default)]
    alternatives: Vec<String>,
    #[serde(default)]
    challenges: Vec<String>,
    #[serde(default)]
    concepts: Vec<String>,
}

fn system_prompt_for(strategy: StrategyName) -> String {
    format!(
        "You are reasoning using the '{}' strategy. Respond with JSON: \
         {{\"description\":str, \"reasoning\":str, \"shouldContinue\":bool, \"confidence\":number, \
         \"alternatives\":[str], \"challenges\":[str], \"concepts\":[str]}}.",
        strategy.as_str()
    )
}

pub struct ThinkingEngine {
    provider: Arc<dyn Provider>,
    optimizer: Arc<TokenOptimizer>,
    selector: Arc<dyn ReasoningStrategySelector>,
}

impl ThinkingEngine {
    pub fn new(provider: Arc<dyn Provider>, optimizer: Arc<TokenOptimizer>) -> Self {
        Self {
            provider,
            optimizer,
            selector: Arc::new(KeywordStrategySelector),
        }
    }

    pub fn with_selector(mut self, selector: Arc<dyn ReasoningStrategySelector>) -> Self {
        self.selector = selector;
        self
    }

    fn build_context(problem: &str, state: &EngineState) -> String {
        let recent: Vec<String> = state
            .steps
            .iter()
            .rev()
            .take(CONTEXT_WINDOW)
            .rev()
            .map(|s| format!("- {}: {}", s.description, s.reasoning))
            .collect();
        format!(
            "Problem: {}\nStep {} of {}\nRecent steps:\n{}",
            problem,
            state.current_step_index + 1,
            state.max_steps,
            if recent.is_empty() { "(none yet)".to_string() } else { recent.join("\n") }
        )
    }

    /// Never fails: internal errors are captured as a terminal error-step
    /// and the caller receives whatever steps completed beforehand.
    pub async fn process(
        &self,
        problem: &str,
        model: &ThinkingModel,
        options: &ThinkingEngineOptions,
        cancel: &CancellationToken,
    ) -> ThinkingResult {
        let started = Instant::now();

        if problem.trim().is_empty() {
            let mut state = EngineState::new(
                problem,
                DEFAULT_TOKEN_BUDGET,
                options.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
                "none",
                model.name.clone(),
            );
            let _ = state.transition(Phase::ProblemAnalysis);
            let _ = state.transition(Phase::StrategySelection);
            let _ = state.transition(Phase::Execution);
            let _ = state.transition(Phase::Conclusion);
            let _ = state.transition(Phase::Completed);
            return ThinkingResult {
                steps: state.steps,
                reasoning: Vec::new(),
                token_usage: Usage::default(),
                execution_time_ms: started.elapsed().as_millis() as u64,
                state_metrics: state.progress_metrics,
                optimization: None,
                phase: state.phase,
                adjustments: state.adjustments,
            };
        }

        let strategy_name = self.selector.select(problem);

        let token_budget = if options.optimize_tokens {
            model.effective_max_tokens()
        } else {
            DEFAULT_TOKEN_BUDGET
        };
        let max_steps = options.max_steps.unwrap_or(DEFAULT_MAX_STEPS);
        let per_step_cap = options.per_step_token_cap.unwrap_or(DEFAULT_STEP_TOKEN_CAP);

        let mut state = EngineState::new(problem, token_budget, max_steps, strategy_name.as_str(), model.name.clone());
        let _ = state.transition(Phase::ProblemAnalysis);
        let _ = state.transition(Phase::StrategySelection);
        let _ = state.transition(Phase::Execution);

        let mut reasoning_texts: Vec<String> = Vec::new();
        let mut total_usage = Usage::default();
        let mut last_optimization: Option<OptimizationOutcome> = None;

        for _ in 0..max_steps {
            if cancel.is_cancelled() {
                let step = ThinkingStep::error("canceled", "operation canceled before step completed");
                let _ = state.push_step(step);
                let _ = state.transition(Phase::Error);
                break;
            }

            let context = Self::build_context(problem, &state);
            let content = if options.optimize_tokens {
                let outcome = self.optimizer.optimize(
                    &context,
                    &OptimizeContext {
                        available_tokens: per_step_cap,
                        model_name: Some(model.name.clone()),
                    },
                );
                let text = outcome.optimized_text.clone();
                last_optimization = Some(outcome);
                text
            } else {
                context
            };

            let request = ModelRequest {
                model_id: model.name.clone(),
                messages: vec![Message::system(system_prompt_for(strategy_name)), Message::user(content)],
                temperature: 0.7,
                max_tokens: per_step_cap,
                timeout_ms: None,
            };

            let response = match self.provider.query(&request, cancel).await {
                Ok(resp) => resp,
                Err(err) => {
                    warn!(error = %err, "thinking engine step failed");
                    let step = ThinkingStep::error("error", format!("step failed: {}", err));
                    let _ = state.push_step(step);
                    let _ = state.transition(Phase::Error);
                    break;
                }
            };

            total_usage.prompt += response.usage.prompt;
            total_usage.completion += response.usage.completion;
            total_usage.total += response.usage.total;

            let raw_text = response.first_text().unwrap_or_default();
            let parsed: StepResponse = match serde_json::from_str(raw_text) {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "failed to parse step response, using conservative defaults");
                    StepResponse {
                        should_continue: Some(true),
                        confidence: Some(0.7),
                        ..Default::default()
                    }
                }
            };

            let reasoning_text = parsed
                .reasoning
                .clone()
                .unwrap_or_else(|| parsed.insights.join(" "));
            let description = parsed
                .description
                .clone()
                .unwrap_or_else(|| format!("step {}", state.steps.len() + 1));
            let should_continue = parsed.should_continue.unwrap_or(true);
            let confidence = parsed.confidence.unwrap_or(0.7);

            let previous_reasonings: Vec<&str> = state.steps.iter().map(|s| s.reasoning.as_str()).collect();
            let step_coherence = coherence(&reasoning_text, &previous_reasonings);
            let step_significance = significance(&reasoning_text, problem);
            let step_complexity = complexity(&reasoning_text, parsed.challenges.len(), parsed.concepts.len(), confidence);

            let token_count = if response.usage.total > 0 {
                response.usage.total
            } else {
                self.optimizer.estimate_tokens(&reasoning_text, Some(&model.name))
            };

            let mut step = ThinkingStep::new(description, reasoning_text.clone(), token_count);
            step.confidence = confidence;
            step.metrics.coherence = step_coherence;
            step.metrics.significance = step_significance;
            step.metrics.complexity = step_complexity;
            let _ = step.set_status(StepStatus::Completed);

            reasoning_texts.push(reasoning_text);

            if state.push_step(step).is_err() {
                break;
            }

            if !should_continue {
                break;
            }
        }

        if state.phase != Phase::Error {
            let _ = state.transition(Phase::Conclusion);
            let _ = state.transition(Phase::Completed);
        }

        ThinkingResult {
            steps: state.steps,
            reasoning: reasoning_texts,
            token_usage: total_usage,
            execution_time_ms: started.elapsed().as_millis() as u64,
            state_metrics: state.progress_metrics,
            optimization: last_optimization,
            phase: state.phase,
            adjustments: state.adjustments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CognitionError, Result};
    use crate::providers::{CancellationSource, Choice, ModelResponse, Role};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedProvider {
        responses: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn query(&self, _req: &ModelRequest, _cancel: &CancellationToken) -> Result<ModelResponse> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(CognitionError::Internal("script exhausted".to_string()));
            }
            let text = responses.remove(0);
            Ok(ModelResponse {
                choices: vec![Choice {
                    message: Message {
                        role: Role::Assistant,
                        content: text.to_string(),
                    },
                }],
                usage: Usage {
                    prompt: 10,
                    completion: 10,
                    total: 20,
                },
                model_id: "test-model".to_string(),
                latency_ms: 5,
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn model() -> ThinkingModel {
        ThinkingModel::default()
    }

    #[tokio::test]
    async fn test_process_stops_on_should_continue_false() {
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(vec![
                r#"{"description":"first","reasoning":"about the database migration plan","shouldContinue":true,"confidence":0.6}"#,
                r#"{"description":"second","reasoning":"final synthesis of the migration plan","shouldContinue":false,"confidence":0.9}"#,
            ]),
        });
        let engine = ThinkingEngine::new(provider, Arc::new(TokenOptimizer::new()));
        let cancel = CancellationSource::new().token();
        let result = engine
            .process("How should we migrate the database", &model(), &ThinkingEngineOptions::default(), &cancel)
            .await;

        assert_eq!(result.steps.len(), 2);
        assert_eq!(result.steps.last().unwrap().description, "second");
        assert!(result.token_usage.total > 0);
    }

    #[tokio::test]
    async fn test_process_never_panics_on_provider_failure() {
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(vec![]),
        });
        let engine = ThinkingEngine::new(provider, Arc::new(TokenOptimizer::new()));
        let cancel = CancellationSource::new().token();
        let result = engine
            .process("A problem with no scripted responses", &model(), &ThinkingEngineOptions::default(), &cancel)
            .await;

        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].status, StepStatus::Error);
    }

    #[tokio::test]
    async fn test_malformed_json_falls_back_conservatively() {
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(vec!["not valid json at all", r#"{"shouldContinue":false}"#]),
        });
        let engine = ThinkingEngine::new(provider, Arc::new(TokenOptimizer::new()));
        let cancel = CancellationSource::new().token();
        let result = engine
            .process("A problem", &model(), &ThinkingEngineOptions::default(), &cancel)
            .await;

        assert_eq!(result.steps[0].confidence, 0.7);
    }

    #[tokio::test]
    async fn test_empty_problem_short_circuits_with_zero_steps() {
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(vec![]),
        });
        let engine = ThinkingEngine::new(provider, Arc::new(TokenOptimizer::new()));
        let cancel = CancellationSource::new().token();
        let result = engine
            .process("", &model(), &ThinkingEngineOptions::default(), &cancel)
            .await;

        assert!(result.steps.is_empty());
        assert!(result.reasoning.is_empty());
        assert_eq!(result.token_usage.total, 0);
        assert_eq!(result.phase, Phase::Completed);
    }

    #[tokio::test]
    async fn test_whitespace_only_problem_short_circuits() {
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(vec![]),
        });
        let engine = ThinkingEngine::new(provider, Arc::new(TokenOptimizer::new()));
        let cancel = CancellationSource::new().token();
        let result = engine
            .process("   \n\t", &model(), &ThinkingEngineOptions::default(), &cancel)
            .await;

        assert!(result.steps.is_empty());
        assert_eq!(result.phase, Phase::Completed);
    }

    #[tokio::test]
    async fn test_respects_max_steps() {
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(vec![
                r#"{"description":"a","reasoning":"r1","shouldContinue":true,"confidence":0.5}"#,
                r#"{"description":"b","reasoning":"r2","shouldContinue":true,"confidence":0.5}"#,
                r#"{"description":"c","reasoning":"r3","shouldContinue":true,"confidence":0.5}"#,
            ]),
        });
        let engine = ThinkingEngine::new(provider, Arc::new(TokenOptimizer::new()));
        let cancel = CancellationSource::new().token();
        let options = ThinkingEngineOptions {
            max_steps: Some(2),
            ..Default::default()
        };
        let result = engine.process("A problem", &model(), &options, &cancel).await;
        assert_eq!(result.steps.len(), 2);
    }
}
