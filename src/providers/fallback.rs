//! Fallback Provider: routes a query to the best-available underlying
//! provider, attempting in priority/weight order and failing over on a
//! terminal error from any one of them.

use super::health::{HealthStatus, HealthTracker};
use super::{CancellationToken, ModelRequest, ModelResponse, Provider};
use crate::error::{CognitionError, Result};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

struct Registration {
    name: String,
    provider: Arc<dyn Provider>,
    priority: i32,
    weight: i32,
    health: HealthTracker,
}

/// Priority/weight-ordered registry of underlying providers. One in-flight
/// attempt at a time per logical call; health updates are serialized by
/// the registry's own lock.
pub struct FallbackProvider {
    registrations: RwLock<Vec<Registration>>,
}

impl Default for FallbackProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackProvider {
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
        }
    }

    /// Registers a provider under `name`. Idempotent: a repeat call with
    /// the same name replaces the provider/priority/weight but preserves
    /// the existing health history rather than starting a new one.
    pub fn register(&self, name: impl Into<String>, provider: Arc<dyn Provider>, priority: i32, weight: i32) {
        let name = name.into();
        let mut registrations = self.registrations.write().expect("registry lock poisoned");
        if let Some(existing) = registrations.iter_mut().find(|r| r.name == name) {
            existing.provider = provider;
            existing.priority = priority;
            existing.weight = weight;
        } else {
            registrations.push(Registration {
                name,
                provider,
                priority,
                weight,
                health: HealthTracker::new(),
            });
        }
    }

    pub fn provider_count(&self) -> usize {
        self.registrations.read().expect("registry lock poisoned").len()
    }

    pub fn health_of(&self, name: &str) -> Option<HealthStatus> {
        self.registrations
            .read()
            .expect("registry lock poisoned")
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.health.status())
    }
}

#[async_trait]
impl Provider for FallbackProvider {
    async fn query(&self, req: &ModelRequest, cancel: &CancellationToken) -> Result<ModelResponse> {
        let ordered: Vec<(String, Arc<dyn Provider>)> = {
            let registrations = self.registrations.read().expect("registry lock poisoned");
            let mut candidates: Vec<&Registration> = registrations
                .iter()
                .filter(|r| r.health.status() != HealthStatus::Unhealthy)
                .collect();
            candidates.sort_by(|a, b| b.priority.cmp(&a.priority).then(b.weight.cmp(&a.weight)));
            candidates
                .into_iter()
                .map(|r| (r.name.clone(), r.provider.clone()))
                .collect()
        };

        if ordered.is_empty() {
            return Err(CognitionError::AllProvidersFailed(vec![
                "no healthy providers registered".to_string(),
            ]));
        }

        let mut causes = Vec::new();
        for (name, provider) in ordered {
            if cancel.is_cancelled() {
                return Err(CognitionError::Canceled);
            }

            match provider.query(req, cancel).await {
                Ok(resp) => {
                    self.mark_success(&name);
                    return Ok(resp);
                }
                Err(CognitionError::Canceled) => return Err(CognitionError::Canceled),
                Err(err) => {
                    self.mark_failure(&name);
                    causes.push(format!("{}: {}", name, err));
                }
            }
        }

        Err(CognitionError::AllProvidersFailed(causes))
    }

    fn name(&self) -> &str {
        "fallback"
    }
}

impl FallbackProvider {
    fn mark_success(&self, name: &str) {
        let registrations = self.registrations.read().expect("registry lock poisoned");
        if let Some(r) = registrations.iter().find(|r| r.name == name) {
            r.health.record_success();
        }
    }

    fn mark_failure(&self, name: &str) {
        let registrations = self.registrations.read().expect("registry lock poisoned");
        if let Some(r) = registrations.iter().find(|r| r.name == name) {
            r.health.record_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CancellationSource, Choice, Message, Role, Usage};

    struct StubProvider {
        name: String,
        result: std::sync::Mutex<Option<Result<ModelResponse>>>,
    }

    fn stub_response() -> ModelResponse {
        ModelResponse {
            choices: vec![Choice {
                message: Message {
                    role: Role::Assistant,
                    content: "ok".to_string(),
                },
            }],
            usage: Usage::default(),
            model_id: "stub".to_string(),
            latency_ms: 1,
        }
    }

    #[async_trait]
    impl Provider for StubProvider {
        async fn query(&self, _req: &ModelRequest, _cancel: &CancellationToken) -> Result<ModelResponse> {
            self.result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(CognitionError::Internal("stub exhausted".to_string())))
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    fn dummy_request() -> ModelRequest {
        ModelRequest {
            model_id: "m".to_string(),
            messages: vec![Message::user("hi")],
            temperature: 0.5,
            max_tokens: 100,
            timeout_ms: None,
        }
    }

    #[tokio::test]
    async fn test_register_is_idempotent_on_name() {
        let fallback = FallbackProvider::new();
        let stub = Arc::new(StubProvider {
            name: "a".to_string(),
            result: std::sync::Mutex::new(Some(Ok(stub_response()))),
        });
        fallback.register("a", stub.clone(), 1, 1);
        fallback.register("a", stub, 2, 2);
        assert_eq!(fallback.provider_count(), 1);
    }

    #[tokio::test]
    async fn test_falls_over_to_next_provider_on_terminal_error() {
        let fallback = FallbackProvider::new();
        let failing = Arc::new(StubProvider {
            name: "primary".to_string(),
            result: std::sync::Mutex::new(Some(Err(CognitionError::AuthFailed("bad key".to_string())))),
        });
        let backup = Arc::new(StubProvider {
            name: "backup".to_string(),
            result: std::sync::Mutex::new(Some(Ok(stub_response()))),
        });
        fallback.register("primary", failing, 10, 1);
        fallback.register("backup", backup, 1, 1);

        let cancel = CancellationSource::new().token();
        let resp = fallback.query(&dummy_request(), &cancel).await.unwrap();
        assert_eq!(resp.first_text(), Some("ok"));
    }

    #[tokio::test]
    async fn test_all_providers_failed_when_exhausted() {
        let fallback = FallbackProvider::new();
        let failing = Arc::new(StubProvider {
            name: "only".to_string(),
            result: std::sync::Mutex::new(Some(Err(CognitionError::ServerError("502".to_string())))),
        });
        fallback.register("only", failing, 1, 1);

        let cancel = CancellationSource::new().token();
        let err = fallback.query(&dummy_request(), &cancel).await.unwrap_err();
        assert!(matches!(err, CognitionError::AllProvidersFailed(_)));
    }

    #[tokio::test]
    async fn test_no_providers_registered_fails_immediately() {
        let fallback = FallbackProvider::new();
        let cancel = CancellationSource::new().token();
        let err = fallback.query(&dummy_request(), &cancel).await.unwrap_err();
        assert!(matches!(err, CognitionError::AllProvidersFailed(_)));
    }
}
