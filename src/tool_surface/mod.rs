//! Thin adapters exposing the abstract operation surface -- `generate`,
//! `thinking_process`, `store_memory`, `retrieve_memory`, `check_cache`,
//! `store_cache`, `perform_maintenance`, `estimate_tokens` -- over the
//! Model Provider Layer, Thinking Engine, Token Optimizer, and Ephemeral
//! Cache. Each operation takes one structured argument and returns one
//! structured result; nothing here holds state of its own beyond the
//! collaborators it was built with.

pub mod memory;

use crate::cache::EphemeralCache;
use crate::error::Result;
use crate::optimizer::{OptimizeContext, OptimizationOutcome, TokenOptimizer};
use crate::providers::{CancellationToken, Message, ModelRequest, Provider, Usage};
use crate::thinking::{ThinkingEngine, ThinkingEngineOptions, ThinkingModel, ThinkingResult};
use memory::{MemoryItem, MemoryStore, RetrieveMemoryRequest, StoreMemoryRequest};
use std::sync::Arc;
use std::time::Duration;

pub struct GenerateRequest {
    pub prompt: String,
    pub model_id: String,
    pub max_tokens: usize,
    pub optimize_tokens: bool,
}

pub struct GenerateResult {
    pub response: String,
    pub model_id: String,
    pub token_usage: Usage,
    pub optimization: Option<OptimizationOutcome>,
    pub cached: bool,
}

pub struct CacheEntry {
    pub response: String,
    pub token_usage: Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceSystem {
    Cache,
    Memory,
    Thinking,
    Optimization,
    All,
}

#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub removed_by_system: Vec<(String, usize)>,
}

/// Default TTL for a cached `generate` response.
const GENERATE_CACHE_TTL: Duration = Duration::from_secs(300);
const GENERATE_CACHE_NAMESPACE: &str = "generate";

/// Binds the provider layer, thinking engine, token optimizer, ephemeral
/// cache, and an optional memory store behind the eight-operation
/// surface. Every field is a shared handle; cloning the surface is cheap
/// and safe across concurrent callers.
pub struct ToolSurface {
    provider: Arc<dyn Provider>,
    optimizer: Arc<TokenOptimizer>,
    cache: Arc<EphemeralCache>,
    thinking: Arc<ThinkingEngine>,
    memory: Option<Arc<dyn MemoryStore>>,
}

impl ToolSurface {
    pub fn new(
        provider: Arc<dyn Provider>,
        optimizer: Arc<TokenOptimizer>,
        cache: Arc<EphemeralCache>,
        thinking: Arc<ThinkingEngine>,
    ) -> Self {
        Self {
            provider,
            optimizer,
            cache,
            thinking,
            memory: None,
        }
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub async fn generate(&self, req: GenerateRequest, cancel: &CancellationToken) -> Result<GenerateResult> {
        let temperature = 0.7;
        let key = crate::cache::derive_key(
            GENERATE_CACHE_NAMESPACE,
            &req.model_id,
            "",
            &req.prompt,
            temperature,
            req.max_tokens,
        );

        if let Some(hit) = self.cache.get(GENERATE_CACHE_NAMESPACE, &key) {
            if let Ok(entry) = serde_json::from_value::<CachedGenerate>(hit) {
                return Ok(GenerateResult {
                    response: entry.response,
                    model_id: req.model_id,
                    token_usage: entry.token_usage,
                    optimization: None,
                    cached: true,
                });
            }
        }

        let (prompt, optimization) = if req.optimize_tokens {
            let ctx = OptimizeContext {
                available_tokens: req.max_tokens,
                model_name: Some(req.model_id.clone()),
            };
            let outcome = self.optimizer.optimize(&req.prompt, &ctx);
            let text = outcome.optimized_text.clone();
            (text, Some(outcome))
        } else {
            (req.prompt.clone(), None)
        };

        let model_request = ModelRequest {
            model_id: req.model_id.clone(),
            messages: vec![Message::user(prompt)],
            temperature,
            max_tokens: req.max_tokens,
            timeout_ms: None,
        };
        let response = self.provider.query(&model_request, cancel).await?;
        self.optimizer
            .observe_usage(&req.model_id, req.max_tokens, response.usage.total);

        let text = response.first_text().unwrap_or_default().to_string();
        let cached = CachedGenerate {
            response: text.clone(),
            token_usage: response.usage,
        };
        if let Ok(value) = serde_json::to_value(&cached) {
            self.cache
                .put(GENERATE_CACHE_NAMESPACE, &key, value, GENERATE_CACHE_TTL);
        }

        Ok(GenerateResult {
            response: text,
            model_id: response.model_id,
            token_usage: response.usage,
            optimization,
            cached: false,
        })
    }

    pub async fn thinking_process(
        &self,
        problem: &str,
        model: &ThinkingModel,
        options: &ThinkingEngineOptions,
        cancel: &CancellationToken,
    ) -> ThinkingResult {
        self.thinking.process(problem, model, options, cancel).await
    }

    pub async fn store_memory(&self, req: StoreMemoryRequest) -> Result<uuid::Uuid> {
        match &self.memory {
            Some(store) => store.store(req).await,
            None => Err(crate::error::CognitionError::Internal(
                "no memory store configured".to_string(),
            )),
        }
    }

    pub async fn retrieve_memory(&self, req: RetrieveMemoryRequest) -> Result<Vec<MemoryItem>> {
        match &self.memory {
            Some(store) => store.retrieve(req).await,
            None => Ok(Vec::new()),
        }
    }

    pub fn check_cache(&self, namespace: &str, key: &str) -> Option<CacheEntry> {
        self.cache
            .get(namespace, key)
            .and_then(|v| serde_json::from_value::<CachedGenerate>(v).ok())
            .map(|c| CacheEntry {
                response: c.response,
                token_usage: c.token_usage,
            })
    }

    pub fn store_cache(&self, namespace: &str, key: &str, response: CacheEntry, ttl: Duration) {
        let cached = CachedGenerate {
            response: response.response,
            token_usage: response.token_usage,
        };
        if let Ok(value) = serde_json::to_value(&cached) {
            self.cache.put(namespace, key, value, ttl);
        }
    }

    pub async fn perform_maintenance(&self, systems: &[MaintenanceSystem]) -> MaintenanceReport {
        let run_all = systems.iter().any(|s| *s == MaintenanceSystem::All);
        let wants = |s: MaintenanceSystem| run_all || systems.contains(&s);

        let mut removed_by_system = Vec::new();
        if wants(MaintenanceSystem::Cache) {
            removed_by_system.push(("cache".to_string(), self.cache.maintenance()));
        }
        if wants(MaintenanceSystem::Memory) {
            let removed = match &self.memory {
                Some(store) => store.maintain().await.unwrap_or(0),
                None => 0,
            };
            removed_by_system.push(("memory".to_string(), removed));
        }
        if wants(MaintenanceSystem::Thinking) {
            // No persistent on-disk thinking state is retained by the core;
            // nothing to reclaim here beyond what callers already dropped.
            removed_by_system.push(("thinking".to_string(), 0));
        }
        if wants(MaintenanceSystem::Optimization) {
            removed_by_system.push(("optimization".to_string(), 0));
        }

        MaintenanceReport { removed_by_system }
    }

    pub fn estimate_tokens(&self, text: &str, model: Option<&str>) -> usize {
        self.optimizer.estimate_tokens(text, model)
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct CachedGenerate {
    response: String,
    token_usage: Usage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CognitionError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Provider for CountingProvider {
        async fn query(&self, req: &ModelRequest, _cancel: &CancellationToken) -> Result<crate::providers::ModelResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(crate::providers::ModelResponse {
                choices: vec![crate::providers::Choice {
                    message: Message::user("reply"),
                }],
                usage: Usage {
                    prompt: 1,
                    completion: 1,
                    total: 2,
                },
                model_id: req.model_id.clone(),
                latency_ms: 1,
            })
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn surface(provider: Arc<CountingProvider>) -> ToolSurface {
        let optimizer = Arc::new(TokenOptimizer::new());
        let cache = Arc::new(EphemeralCache::new(16));
        let thinking = Arc::new(ThinkingEngine::new(provider.clone(), optimizer.clone()));
        ToolSurface::new(provider, optimizer, cache, thinking)
    }

    #[tokio::test]
    async fn test_generate_caches_second_call() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let surface = surface(provider.clone());
        let cancel = crate::providers::CancellationSource::new().token();
        let req = || GenerateRequest {
            prompt: "hello".to_string(),
            model_id: "m".to_string(),
            max_tokens: 100,
            optimize_tokens: false,
        };
        let first = surface.generate(req(), &cancel).await.unwrap();
        assert!(!first.cached);
        let second = surface.generate(req(), &cancel).await.unwrap();
        assert!(second.cached);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_memory_without_backing_store_errors() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let surface = surface(provider);
        let result = surface
            .store_memory(StoreMemoryRequest {
                memory_type: "note".to_string(),
                content: "x".to_string(),
                importance: None,
                connections: Vec::new(),
            })
            .await;
        assert!(matches!(result, Err(CognitionError::Internal(_))));
    }

    #[tokio::test]
    async fn test_retrieve_memory_without_backing_store_returns_empty() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let surface = surface(provider);
        let result = surface
            .retrieve_memory(RetrieveMemoryRequest {
                query: "x".to_string(),
                limit: None,
            })
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_perform_maintenance_all_covers_every_system() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let surface = surface(provider);
        let report = surface.perform_maintenance(&[MaintenanceSystem::All]).await;
        let names: Vec<&str> = report
            .removed_by_system
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert!(names.contains(&"cache"));
        assert!(names.contains(&"memory"));
        assert!(names.contains(&"thinking"));
        assert!(names.contains(&"optimization"));
    }

    #[test]
    fn test_estimate_tokens_delegates_to_optimizer() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let surface = surface(provider);
        assert!(surface.estimate_tokens("hello world", None) > 0);
    }
}
