//! Job status values written to the status store.

use serde::{Deserialize, Serialize};

/// Final status of a job.
///
/// Only successful completion is ever recorded; failed jobs keep whatever
/// status the store already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Completed,
}

impl JobStatus {
    /// Attribute value stored for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Completed => "Completed",
        }
    }
}

impl core::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
