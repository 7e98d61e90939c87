//! Model Provider Layer: a uniform `query(req) → resp` operation over one
//! remote model endpoint ([`single::ModelProvider`]), and a
//! priority/weight-ordered registry that routes to the best available
//! underlying provider ([`fallback::FallbackProvider`]).

pub mod fallback;
pub mod health;
pub mod single;

pub use fallback::FallbackProvider;
pub use health::{HealthStatus, HealthTracker};
pub use single::ModelProvider;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model_id: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt: usize,
    pub completion: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub choices: Vec<Choice>,
    pub usage: Usage,
    pub model_id: String,
    pub latency_ms: u64,
}

impl ModelResponse {
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Cooperative cancellation signal shared between a caller and whichever
/// provider attempt is currently in flight. Cloning shares the same
/// underlying signal; firing it from any clone cancels all of them.
#[derive(Clone)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the token is canceled; intended for use in a
    /// `tokio::select!` alongside the in-flight request future.
    pub async fn cancelled(&mut self) {
        if *self.rx.borrow() {
            return;
        }
        let _ = self.rx.changed().await;
    }
}

pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Uniform interface implemented by both a single remote endpoint and the
/// Fallback Provider that routes across several of them.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn query(&self, req: &ModelRequest, cancel: &CancellationToken) -> Result<ModelResponse>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancellation_token_fires() {
        let source = CancellationSource::new();
        let mut token = source.token();
        assert!(!token.is_cancelled());
        source.cancel();
        token.cancelled().await;
        assert!(token.is_cancelled());
    }
}
