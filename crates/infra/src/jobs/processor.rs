//! Batch processing: parse, validate, execute, and record each message.
//!
//! Each message moves `Received -> Parsed -> Validated -> Executed ->
//! Recorded -> Succeeded`; an error at any transition marks it failed and
//! processing moves on to the next message. The batch itself never fails.

use tracing::{error, info, info_span, warn};

use exportq_core::{
    check_task_parameters, BatchSummary, JobId, JobMessage, JobStatus, MessageFailure, MessageId,
    ProcessingError,
};

use crate::config::ProcessorConfig;

use super::executor::{SimulatedExportRunner, TaskExecutor, TaskRunner};
use super::store::{StatusRecorder, StatusStore};

/// One undecoded queue message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub message_id: MessageId,
    pub body: String,
}

impl RawMessage {
    pub fn new(message_id: impl Into<MessageId>, body: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            body: body.into(),
        }
    }
}

/// Sequential batch processor.
///
/// The store and runner are injected; one processor is built per process and
/// reused for every batch.
#[derive(Debug)]
pub struct BatchProcessor<S: StatusStore, R: TaskRunner> {
    executor: TaskExecutor<R>,
    recorder: StatusRecorder<S>,
}

impl<S: StatusStore> BatchProcessor<S, SimulatedExportRunner> {
    /// Build a processor running the simulated export for the configured duration.
    pub fn from_config(config: &ProcessorConfig, store: S) -> Self {
        Self::new(store, SimulatedExportRunner::new(config.task_duration))
    }
}

impl<S: StatusStore, R: TaskRunner> BatchProcessor<S, R> {
    pub fn new(store: S, runner: R) -> Self {
        Self {
            executor: TaskExecutor::new(runner),
            recorder: StatusRecorder::new(store),
        }
    }

    pub fn store(&self) -> &S {
        self.recorder.store()
    }

    pub fn runner(&self) -> &R {
        self.executor.runner()
    }

    /// Process every message in delivery order and summarise the outcome.
    pub fn process_batch(&self, messages: &[RawMessage]) -> BatchSummary {
        info!(message_count = messages.len(), "processing batch");
        let mut summary = BatchSummary::begin();

        for message in messages {
            match self.process_message(message) {
                Ok(_) => {
                    summary.record_success();
                    info!(message_id = %message.message_id, "message processed successfully");
                }
                Err(failure) => {
                    error!(
                        message_id = %failure.message_id,
                        job_id = failure.job_id.as_ref().map(JobId::as_str),
                        stage = %failure.stage,
                        error = %failure.error,
                        "failed to process message"
                    );
                    summary.record_failure(failure);
                }
            }
        }

        let summary = summary.finish();
        info!(
            success_count = summary.success_count,
            failure_count = summary.failure_count,
            duration_ms = summary.duration_ms(),
            "{summary}"
        );
        summary
    }

    /// Run one message through the pipeline, returning the task result.
    pub fn process_message(&self, message: &RawMessage) -> Result<String, MessageFailure> {
        let span = info_span!("message", message_id = %message.message_id);
        let _guard = span.enter();

        let mut job_id = None;
        self.run_pipeline(message, &mut job_id)
            .map_err(|e| MessageFailure {
                message_id: message.message_id.clone(),
                job_id,
                stage: e.stage(),
                error: e.to_string(),
            })
    }

    fn run_pipeline(
        &self,
        message: &RawMessage,
        job_id_out: &mut Option<JobId>,
    ) -> Result<String, ProcessingError> {
        info!(body = %message.body, "message body");

        let job = JobMessage::parse(&message.body).inspect_err(|e| {
            warn!(error = %e, "failed to parse message body as JSON");
        })?;
        info!(job_id = %job.job_id, task_type = %job.task_type, timestamp = ?job.timestamp, "parsed job message");

        let job_id = JobId::new(job.job_id.as_str());
        *job_id_out = Some(job_id.clone());

        let task_type =
            check_task_parameters(Some(job.job_id.as_str()), Some(job.task_type.as_str()))?;

        let result = self.executor.execute(&job_id, task_type)?;
        info!(job_id = %job_id, result = %result, "task processing result");

        // The export has already run; a failure here leaves its status unrecorded.
        self.recorder.record_status(&job_id, JobStatus::Completed)?;

        Ok(result)
    }
}
