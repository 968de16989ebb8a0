//! DynamoDB-backed status store.
//!
//! ## Update semantics
//!
//! `UpdateItem` creates the item when the key is absent, so the default
//! [`UpdateSemantics::Upsert`] maps directly onto it. Under
//! [`UpdateSemantics::ExistingOnly`] the update carries
//! `attribute_exists(<key>)` as a condition and a missing key is rejected.
//!
//! ## Error Mapping
//!
//! | SDK error | PersistenceError |
//! |-----------|------------------|
//! | dispatch failure / timeout / unparseable response | `Unavailable` |
//! | `ResourceNotFoundException` (table missing) | `Unavailable` |
//! | `ValidationException` (key schema mismatch) | `KeySchema` |
//! | `ConditionalCheckFailedException` | `Rejected` |
//! | any other service error | `Rejected` |
//! | no usable tokio runtime | `Unavailable` |

use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::update_item::builders::UpdateItemFluentBuilder;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task;
use tracing::{debug, instrument};

use exportq_core::{JobId, JobStatus, PersistenceError};

use crate::config::StatusStoreConfig;

use super::store::{StatusStore, UpdateSemantics};

const STATUS_ATTRIBUTE: &str = "status";

/// Status store writing to a DynamoDB table.
///
/// The client is built once and shared by every update. `DynamoDbStatusStore`
/// is `Send + Sync`.
#[derive(Debug, Clone)]
pub struct DynamoDbStatusStore {
    client: Client,
    config: StatusStoreConfig,
}

impl DynamoDbStatusStore {
    /// Wrap an existing client.
    pub fn new(client: Client, config: StatusStoreConfig) -> Self {
        Self { client, config }
    }

    /// Build a client for the configured region from the default credential chain.
    pub async fn connect(config: StatusStoreConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        Self::new(Client::new(&sdk_config), config)
    }

    pub fn config(&self) -> &StatusStoreConfig {
        &self.config
    }

    fn update_request(&self, job_id: &JobId, status: JobStatus) -> UpdateItemFluentBuilder {
        let request = self
            .client
            .update_item()
            .table_name(&self.config.table_name)
            .key(
                &self.config.key_attribute,
                AttributeValue::S(job_id.as_str().to_string()),
            )
            .update_expression("SET #status = :status")
            .expression_attribute_names("#status", STATUS_ATTRIBUTE)
            .expression_attribute_values(":status", AttributeValue::S(status.as_str().to_string()));

        match self.config.semantics {
            UpdateSemantics::Upsert => request,
            UpdateSemantics::ExistingOnly => request
                .condition_expression("attribute_exists(#key)")
                .expression_attribute_names("#key", &self.config.key_attribute),
        }
    }

    #[instrument(skip(self), fields(table = %self.config.table_name))]
    pub async fn update_status(
        &self,
        job_id: &JobId,
        status: JobStatus,
    ) -> Result<(), PersistenceError> {
        self.update_request(job_id, status)
            .send()
            .await
            .map_err(|e| map_update_error(job_id, e))?;

        debug!(job_id = %job_id, status = %status, "dynamodb status updated");
        Ok(())
    }
}

/// Blocking bridge onto the async SDK.
///
/// Works from a blocking-pool thread or a multi-thread runtime worker (via
/// `block_in_place`). Outside any runtime, or on a current-thread runtime
/// where blocking would stall the driver, the update is reported as
/// `Unavailable` instead.
impl StatusStore for DynamoDbStatusStore {
    fn upsert_status(&self, job_id: &JobId, status: JobStatus) -> Result<(), PersistenceError> {
        let handle = Handle::try_current().map_err(|_| {
            PersistenceError::unavailable("no tokio runtime available to drive the DynamoDB client")
        })?;

        if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
            return Err(PersistenceError::unavailable(
                "DynamoDB updates cannot block a current-thread tokio runtime",
            ));
        }

        task::block_in_place(|| handle.block_on(self.update_status(job_id, status)))
    }
}

fn map_update_error<R>(job_id: &JobId, err: SdkError<UpdateItemError, R>) -> PersistenceError
where
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(ctx) => {
            let service_err = ctx.into_err();
            let message = DisplayErrorContext(&service_err).to_string();
            if service_err.is_conditional_check_failed_exception() {
                PersistenceError::rejected(job_id, "no record exists for key")
            } else if service_err.is_resource_not_found_exception() {
                PersistenceError::Unavailable(message)
            } else if service_err.code() == Some("ValidationException") {
                PersistenceError::KeySchema(message)
            } else {
                PersistenceError::rejected(job_id, message)
            }
        }
        other => PersistenceError::Unavailable(DisplayErrorContext(&other).to_string()),
    }
}
