//! `ThinkingStep`: one unit of reasoning appended to an engine run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
    Error,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Error)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StepMetrics {
    pub coherence: f32,
    pub complexity: f32,
    pub significance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingStep {
    pub id: Uuid,
    pub description: String,
    pub reasoning: String,
    pub token_count: usize,
    pub status: StepStatus,
    pub timestamp: DateTime<Utc>,
    pub confidence: f32,
    pub metrics: StepMetrics,
}

impl ThinkingStep {
    pub fn new(description: impl Into<String>, reasoning: impl Into<String>, token_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            reasoning: reasoning.into(),
            token_count,
            status: StepStatus::Pending,
            timestamp: Utc::now(),
            confidence: 0.0,
            metrics: StepMetrics::default(),
        }
    }

    pub fn error(description: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            reasoning: reasoning.into(),
            token_count: 0,
            status: StepStatus::Error,
            timestamp: Utc::now(),
            confidence: 0.0,
            metrics: StepMetrics::default(),
        }
    }

    /// Transitions status, refusing once the step is already terminal.
    pub fn set_status(&mut self, status: StepStatus) -> Result<(), String> {
        if self.status.is_terminal() {
            return Err(format!(
                "cannot transition step {} out of terminal status {:?}",
                self.id, self.status
            ));
        }
        self.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_step_is_immutable() {
        let mut step = ThinkingStep::new("d", "r", 10);
        step.set_status(StepStatus::Completed).unwrap();
        assert!(step.set_status(StepStatus::Active).is_err());
    }

    #[test]
    fn test_pending_step_can_transition() {
        let mut step = ThinkingStep::new("d", "r", 10);
        assert!(step.set_status(StepStatus::Active).is_ok());
        assert_eq!(step.status, StepStatus::Active);
    }
}
