//! Inbound job message model.

use serde::{Deserialize, Serialize};

use crate::error::ProcessingError;

/// Task kinds this processor knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Export,
}

impl TaskType {
    /// Exact, case-sensitive lookup of a wire name.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "export" => Some(TaskType::Export),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Export => "export",
        }
    }
}

impl core::fmt::Display for TaskType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One job request, parsed from a queue message body.
///
/// `job_id` and `task_type` are kept as raw strings: blank or unsupported
/// values are a validation concern, not a format concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobMessage {
    pub job_id: String,
    pub task_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl JobMessage {
    pub fn new(job_id: impl Into<String>, task_type: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            task_type: task_type.into(),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Parse a raw message body.
    pub fn parse(body: &str) -> Result<Self, ProcessingError> {
        serde_json::from_str(body).map_err(ProcessingError::MessageFormat)
    }
}
