//! A single remote model endpoint, reached through an OpenAI-compatible
//! chat-completions shape, with retry, backoff-with-jitter, adaptive
//! timeout, and health tracking.

use super::health::{HealthStatus, HealthTracker};
use super::{CancellationToken, Message, ModelRequest, ModelResponse, Provider, Role, Usage};
use crate::error::{CognitionError, Result};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE_MS: u64 = 1000;
const BACKOFF_JITTER_MS: u64 = 1000;
/// A success is "slow" once it crosses this fraction of the current
/// deadline; triggers the adaptive-timeout increase for the next call.
const SLOW_SUCCESS_FRACTION: f64 = 0.8;
const ADAPTIVE_GROWTH: f64 = 1.25;
const ADAPTIVE_CEILING_MULTIPLIER: f64 = 4.0;

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessageOwned,
}

#[derive(Debug, Deserialize)]
struct WireMessageOwned {
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// A single router-reached model endpoint. All logical providers share
/// the same wire shape; only `model` in the request body differs.
pub struct ModelProvider {
    name: String,
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    health: HealthTracker,
    adaptive_multiplier: RwLock<f64>,
    base_timeout: Duration,
}

impl ModelProvider {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(CognitionError::from)?;

        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
            health: HealthTracker::new(),
            adaptive_multiplier: RwLock::new(1.0),
            base_timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn health_status(&self) -> HealthStatus {
        self.health.status()
    }

    fn current_timeout(&self, requested_ms: Option<u64>) -> Duration {
        if let Some(ms) = requested_ms {
            return Duration::from_millis(ms);
        }
        let multiplier = *self.adaptive_multiplier.read().expect("adaptive lock poisoned");
        let scaled = self.base_timeout.mul_f64(multiplier);
        let ceiling = self.base_timeout.mul_f64(ADAPTIVE_CEILING_MULTIPLIER);
        scaled.min(ceiling)
    }

    fn record_latency(&self, deadline: Duration, latency: Duration) {
        let mut multiplier = self.adaptive_multiplier.write().expect("adaptive lock poisoned");
        if latency.as_secs_f64() >= deadline.as_secs_f64() * SLOW_SUCCESS_FRACTION {
            *multiplier = (*multiplier * ADAPTIVE_GROWTH).min(ADAPTIVE_CEILING_MULTIPLIER);
        } else {
            *multiplier = 1.0;
        }
    }

    fn backoff_delay(attempt: u32) -> Duration {
        let exp = BACKOFF_BASE_MS.saturating_mul(1 << attempt.saturating_sub(1));
        let jitter = rand::thread_rng().gen_range(0..=BACKOFF_JITTER_MS);
        Duration::from_millis(exp + jitter)
    }

    async fn call_once(&self, req: &ModelRequest, timeout: Duration) -> Result<ModelResponse> {
        let wire_req = WireRequest {
            model: &req.model_id,
            messages: req
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: role_str(m.role),
                    content: &m.content,
                })
                .collect(),
            temperature: req.temperature,
            max_tokens: req.max_tokens,
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&wire_req)
            .send()
            .await
            .map_err(CognitionError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => CognitionError::AuthFailed(body),
                429 => CognitionError::RateLimited(body),
                400..=499 => CognitionError::InvalidRequest(body),
                500..=599 => CognitionError::ServerError(body),
                _ => CognitionError::ServerError(format!("unexpected status {}: {}", status, body)),
            });
        }

        let wire: WireResponse = response.json().await.map_err(CognitionError::from)?;
        let latency = started.elapsed();

        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CognitionError::Parse("empty choices array".to_string()))?;

        Ok(ModelResponse {
            choices: vec![super::Choice {
                message: Message {
                    role: Role::Assistant,
                    content: choice.message.content,
                },
            }],
            usage: Usage {
                prompt: wire.usage.prompt_tokens,
                completion: wire.usage.completion_tokens,
                total: wire.usage.total_tokens,
            },
            model_id: req.model_id.clone(),
            latency_ms: latency.as_millis() as u64,
        })
    }
}

#[async_trait]
impl Provider for ModelProvider {
    async fn query(&self, req: &ModelRequest, cancel: &CancellationToken) -> Result<ModelResponse> {
        if cancel.is_cancelled() {
            return Err(CognitionError::Canceled);
        }

        let timeout = self.current_timeout(req.timeout_ms);
        let mut last_err = CognitionError::Internal("no attempt made".to_string());

        for attempt in 1..=MAX_RETRIES {
            if cancel.is_cancelled() {
                return Err(CognitionError::Canceled);
            }

            match self.call_once(req, timeout).await {
                Ok(resp) => {
                    self.health.record_success();
                    self.record_latency(timeout, Duration::from_millis(resp.latency_ms));
                    return Ok(resp);
                }
                Err(err) => {
                    self.health.record_failure();
                    warn!(provider = %self.name, attempt, error = %err, "provider call failed");
                    let transient = err.is_transient();
                    last_err = err;
                    if !transient || attempt == MAX_RETRIES {
                        break;
                    }
                    let delay = Self::backoff_delay(attempt);
                    debug!(provider = %self.name, ?delay, "retrying after backoff");
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(last_err)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
