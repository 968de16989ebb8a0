//! Error taxonomy for the message-processing pipeline.
//!
//! Every variant here is recovered at single-message granularity by the batch
//! processor; none of them abort a batch.

use serde::Serialize;
use thiserror::Error;

use crate::id::JobId;

/// Reason a job's parameters were rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `jobId` was absent, empty, or whitespace-only.
    #[error("invalid job id: missing or blank")]
    MissingJobId,

    /// `taskType` was absent, empty, or whitespace-only.
    #[error("invalid task type: missing or blank")]
    MissingTaskType,

    /// `taskType` named a task this processor does not run.
    #[error("unsupported task type: {0}")]
    UnsupportedTaskType(String),
}

/// Task execution failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The blocking wait was interrupted externally.
    #[error("export task interrupted for job: {job_id}")]
    Interrupted { job_id: JobId },

    /// The task faulted unexpectedly.
    #[error("export task failed for job: {job_id}: {reason}")]
    Failed { job_id: JobId, reason: String },
}

impl ExecutionError {
    pub fn failed(job_id: &JobId, reason: impl Into<String>) -> Self {
        Self::Failed {
            job_id: job_id.clone(),
            reason: reason.into(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        match self {
            ExecutionError::Interrupted { job_id } | ExecutionError::Failed { job_id, .. } => {
                job_id
            }
        }
    }
}

/// Status store failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The store could not be reached (network, timeout, missing table).
    #[error("status store unavailable: {0}")]
    Unavailable(String),

    /// The key attribute does not match the table's key schema.
    #[error("status store key schema mismatch: {0}")]
    KeySchema(String),

    /// The store refused the update.
    #[error("status update rejected for job {job_id}: {reason}")]
    Rejected { job_id: JobId, reason: String },
}

impl PersistenceError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn rejected(job_id: &JobId, reason: impl Into<String>) -> Self {
        Self::Rejected {
            job_id: job_id.clone(),
            reason: reason.into(),
        }
    }
}

/// Pipeline transition at which a message failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Parse,
    Validate,
    Execute,
    Record,
}

impl core::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            FailureStage::Parse => "parse",
            FailureStage::Validate => "validate",
            FailureStage::Execute => "execute",
            FailureStage::Record => "record",
        };
        f.write_str(s)
    }
}

/// Any failure raised while processing one message.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("invalid message format: {0}")]
    MessageFormat(#[source] serde_json::Error),

    #[error("invalid task parameters: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ProcessingError {
    pub fn stage(&self) -> FailureStage {
        match self {
            ProcessingError::MessageFormat(_) => FailureStage::Parse,
            ProcessingError::Validation(_) => FailureStage::Validate,
            ProcessingError::Execution(_) => FailureStage::Execute,
            ProcessingError::Persistence(_) => FailureStage::Record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_follows_variant() {
        let err: ProcessingError = ValidationError::MissingJobId.into();
        assert_eq!(err.stage(), FailureStage::Validate);

        let err: ProcessingError = ExecutionError::Interrupted {
            job_id: JobId::new("J1"),
        }
        .into();
        assert_eq!(err.stage(), FailureStage::Execute);

        let err: ProcessingError = PersistenceError::unavailable("down").into();
        assert_eq!(err.stage(), FailureStage::Record);

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ProcessingError::MessageFormat(parse).stage(), FailureStage::Parse);
    }

    #[test]
    fn execution_error_carries_job_id() {
        let err = ExecutionError::failed(&JobId::new("J9"), "boom");
        assert_eq!(err.job_id().as_str(), "J9");
        assert_eq!(err.to_string(), "export task failed for job: J9: boom");
    }
}
