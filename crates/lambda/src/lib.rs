//! SQS-triggered Lambda entry point for the export job processor.
//!
//! The handler converts the SQS event into [`RawMessage`]s and runs the batch
//! on a blocking thread: the export task blocks for its whole duration and
//! must not stall the async runtime.

use std::sync::Arc;

use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::Error;
use tracing::{info, warn};

use exportq_core::{BatchSummary, MessageId};
use exportq_infra::jobs::{BatchProcessor, RawMessage, StatusStore, TaskRunner};

/// Convert SQS records into raw messages, preserving delivery order.
///
/// Records without a message id get a generated one; a missing body becomes
/// the empty string and fails parsing downstream.
pub fn raw_messages(event: SqsEvent) -> Vec<RawMessage> {
    event
        .records
        .into_iter()
        .map(|record| {
            let message_id = match record.message_id {
                Some(id) => MessageId::new(id),
                None => {
                    let generated = MessageId::generate();
                    warn!(message_id = %generated, "sqs record has no message id; generated one");
                    generated
                }
            };
            RawMessage {
                message_id,
                body: record.body.unwrap_or_default(),
            }
        })
        .collect()
}

/// Process one SQS event and return the batch summary.
pub async fn process_event<S, R>(
    processor: Arc<BatchProcessor<S, R>>,
    request_id: &str,
    event: SqsEvent,
) -> Result<BatchSummary, Error>
where
    S: StatusStore + 'static,
    R: TaskRunner + 'static,
{
    info!(request_id, record_count = event.records.len(), "received sqs event");

    let messages = raw_messages(event);
    let summary =
        tokio::task::spawn_blocking(move || processor.process_batch(&messages)).await?;

    info!(request_id, "{summary}");
    Ok(summary)
}

/// Lambda handler body: the summary line is the invocation's only return value.
pub async fn handle<S, R>(
    processor: Arc<BatchProcessor<S, R>>,
    request_id: &str,
    event: SqsEvent,
) -> Result<String, Error>
where
    S: StatusStore + 'static,
    R: TaskRunner + 'static,
{
    process_event(processor, request_id, event)
        .await
        .map(|summary| summary.to_string())
}
