//! `OptimizationRecord` -- the audit trail entry `optimize()` leaves
//! behind for later EMA calibration and best-effort snapshotting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRecord {
    pub original_tokens: usize,
    pub optimized_tokens: usize,
    pub savings: usize,
    pub model_id: Option<String>,
    pub context_tag: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl OptimizationRecord {
    pub fn new(
        original_tokens: usize,
        optimized_tokens: usize,
        model_id: Option<String>,
        context_tag: Option<String>,
    ) -> Self {
        Self {
            original_tokens,
            savings: original_tokens.saturating_sub(optimized_tokens),
            optimized_tokens,
            model_id,
            context_tag,
            timestamp: Utc::now(),
        }
    }
}
