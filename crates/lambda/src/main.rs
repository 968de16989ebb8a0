use std::sync::Arc;

use anyhow::Context;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

use aws_lambda_events::event::sqs::SqsEvent;
use exportq_infra::jobs::{BatchProcessor, DynamoDbStatusStore};
use exportq_infra::ProcessorConfig;

#[tokio::main]
async fn main() -> Result<(), Error> {
    exportq_observability::init();

    let config = ProcessorConfig::from_env().context("failed to load processor configuration")?;
    tracing::info!(
        table = %config.store.table_name,
        key_attribute = %config.store.key_attribute,
        region = %config.store.region,
        semantics = ?config.store.semantics,
        task_duration_ms = config.task_duration.as_millis() as u64,
        "export processor starting"
    );

    let store = DynamoDbStatusStore::connect(config.store.clone()).await;
    let processor = Arc::new(BatchProcessor::from_config(&config, store));

    run(service_fn(move |event: LambdaEvent<SqsEvent>| {
        let processor = processor.clone();
        async move {
            let (payload, context) = event.into_parts();
            exportq_lambda::handle(processor, &context.request_id, payload).await
        }
    }))
    .await
}
