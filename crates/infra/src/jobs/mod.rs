//! Export job pipeline: batch intake, execution, and status recording.
//!
//! ## Design
//!
//! - Messages in a batch are processed sequentially, in delivery order
//! - A failure at any stage is isolated to its message; the batch continues
//! - Only `Completed` is ever written to the status store
//! - No retries, backoff, or dead-lettering
//!
//! ## Components
//!
//! - `BatchProcessor`: parse → validate → execute → record, per message
//! - `TaskExecutor`: runs a `TaskRunner`, containing its faults
//! - `StatusRecorder`: writes outcomes through a `StatusStore`
//! - `InMemoryStatusStore` / `DynamoDbStatusStore`: store backends

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod executor;
pub mod processor;
pub mod store;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStatusStore;
pub use executor::{InterruptHandle, SimulatedExportRunner, TaskExecutor, TaskRunner};
pub use processor::{BatchProcessor, RawMessage};
pub use store::{InMemoryStatusStore, StatusRecorder, StatusStore, UpdateSemantics};
