//! `exportq-core` — domain building blocks for the export job pipeline.
//!
//! This crate contains **pure domain** types and rules (no infrastructure
//! concerns): message parsing, parameter validation, status values, and the
//! error taxonomy shared by every pipeline stage.

pub mod error;
pub mod id;
pub mod message;
pub mod status;
pub mod summary;
pub mod validation;

pub use error::{ExecutionError, FailureStage, PersistenceError, ProcessingError, ValidationError};
pub use id::{JobId, MessageId};
pub use message::{JobMessage, TaskType};
pub use status::JobStatus;
pub use summary::{BatchSummary, MessageFailure};
pub use validation::{check_task_parameters, validate};
