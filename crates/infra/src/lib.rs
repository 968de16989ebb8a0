//! Infrastructure layer: configuration, task execution, status storage, and
//! batch orchestration.

pub mod config;
pub mod jobs;

pub use config::{ConfigError, ProcessorConfig, StatusStoreConfig};
