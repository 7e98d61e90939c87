//! Error types for the cognitive orchestration engine
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation at the
//! edges (CLI, tool-surface adapters).

use thiserror::Error;

/// Error taxonomy surfaced by the provider layer, the engine, and the
/// pipeline orchestrator.
#[derive(Error, Debug, Clone)]
pub enum CognitionError {
    /// The caller's cancellation signal fired before or during a call.
    #[error("operation canceled")]
    Canceled,

    /// A provider call exceeded its deadline.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// Transport-level failure (DNS, connection reset, etc).
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 429 or an equivalent provider-side throttle signal.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// HTTP 401/403 or an equivalent credential failure.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The request was malformed in a way no retry can fix.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP 5xx or an equivalent provider-side fault.
    #[error("server error: {0}")]
    ServerError(String),

    /// The response body could not be parsed into the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Every provider in a Fallback Provider's registry failed.
    #[error("all providers failed: {0:?}")]
    AllProvidersFailed(Vec<String>),

    /// A pipeline stage exhausted its provider's retry/fallback budget.
    #[error("pipeline failed at stage {stage}: {cause}")]
    PipelineFailed { stage: usize, cause: String },

    /// A token budget was exceeded and no adjustment raised it.
    #[error("token budget exceeded: used {used}, budget {budget}")]
    BudgetExceeded { used: usize, budget: usize },

    /// Configuration error (missing/invalid recognized option).
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (cache/snapshot persistence).
    #[error("I/O error: {0}")]
    Io(String),

    /// Catch-all for invariant violations that should never surface to a
    /// caller untyped.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CognitionError {
    /// Whether this belongs to the transient category the provider's retry
    /// policy should attempt again: network, timeout, rate-limit, 5xx.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CognitionError::Network(_)
                | CognitionError::Timeout(_)
                | CognitionError::RateLimited(_)
                | CognitionError::ServerError(_)
        )
    }
}

impl From<reqwest::Error> for CognitionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CognitionError::Timeout(0)
        } else {
            CognitionError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CognitionError {
    fn from(err: serde_json::Error) -> Self {
        CognitionError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for CognitionError {
    fn from(err: std::io::Error) -> Self {
        CognitionError::Io(err.to_string())
    }
}

impl From<anyhow::Error> for CognitionError {
    fn from(err: anyhow::Error) -> Self {
        CognitionError::Internal(err.to_string())
    }
}

/// Result type alias used throughout the engine.
pub type Result<T> = std::result::Result<T, CognitionError>;
