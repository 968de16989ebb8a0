//! Per-invocation batch summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::FailureStage;
use crate::id::{JobId, MessageId};

/// A message that did not make it to `Succeeded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageFailure {
    pub message_id: MessageId,
    /// Present once the body parsed.
    pub job_id: Option<JobId>,
    pub stage: FailureStage,
    pub error: String,
}

/// Outcome of one batch invocation. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<MessageFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    /// Start an empty summary stamped with the current time.
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            success_count: 0,
            failure_count: 0,
            failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_failure(&mut self, failure: MessageFailure) {
        self.failure_count += 1;
        self.failures.push(failure);
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Number of messages accounted for.
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at).num_milliseconds().max(0) as u64
    }
}

impl core::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Processing completed. Success: {}. Failures: {}.",
            self.success_count, self.failure_count
        )
    }
}
