//! Configuration loading and representation.
//!
//! Values come from the process environment at startup and are passed
//! explicitly into constructors from there on.

use std::time::Duration;

use thiserror::Error;

use crate::jobs::store::UpdateSemantics;

pub const DEFAULT_KEY_ATTRIBUTE: &str = "jobId";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TASK_DURATION: Duration = Duration::from_secs(10);

/// Configuration error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("setting {name} must not be blank")]
    Blank { name: &'static str },
    #[error("setting {name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Where and how job status is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusStoreConfig {
    pub table_name: String,
    pub key_attribute: String,
    pub region: String,
    pub semantics: UpdateSemantics,
}

impl StatusStoreConfig {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
            region: DEFAULT_REGION.to_string(),
            semantics: UpdateSemantics::default(),
        }
    }

    pub fn with_key_attribute(mut self, key_attribute: impl Into<String>) -> Self {
        self.key_attribute = key_attribute.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_semantics(mut self, semantics: UpdateSemantics) -> Self {
        self.semantics = semantics;
        self
    }
}

/// Processor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub store: StatusStoreConfig,
    /// How long the simulated export blocks.
    pub task_duration: Duration,
}

impl ProcessorConfig {
    pub fn new(store: StatusStoreConfig) -> Self {
        Self {
            store,
            task_duration: DEFAULT_TASK_DURATION,
        }
    }

    pub fn with_task_duration(mut self, duration: Duration) -> Self {
        self.task_duration = duration;
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// Reads `STATUS_TABLE_NAME` (falling back to `TABLE_NAME`),
    /// `STATUS_KEY_ATTRIBUTE`, `AWS_REGION`, `STATUS_REQUIRE_EXISTING` and
    /// `EXPORT_TASK_DURATION_MS`. Only the table name is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let table_name = match lookup("STATUS_TABLE_NAME") {
            Some(v) => non_blank("STATUS_TABLE_NAME", v)?,
            None => non_blank(
                "TABLE_NAME",
                lookup("TABLE_NAME").ok_or(ConfigError::Missing("STATUS_TABLE_NAME"))?,
            )?,
        };

        let mut store = StatusStoreConfig::new(table_name);

        if let Some(v) = lookup("STATUS_KEY_ATTRIBUTE") {
            store.key_attribute = non_blank("STATUS_KEY_ATTRIBUTE", v)?;
        }
        if let Some(v) = lookup("AWS_REGION") {
            store.region = non_blank("AWS_REGION", v)?;
        }
        if let Some(v) = lookup("STATUS_REQUIRE_EXISTING") {
            if parse_bool("STATUS_REQUIRE_EXISTING", &v)? {
                store.semantics = UpdateSemantics::ExistingOnly;
            }
        }

        let mut config = Self::new(store);

        if let Some(v) = lookup("EXPORT_TASK_DURATION_MS") {
            let ms = v.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "EXPORT_TASK_DURATION_MS",
                value: v.clone(),
                reason: e.to_string(),
            })?;
            config.task_duration = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn non_blank(name: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Blank { name });
    }
    Ok(trimmed.to_string())
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_table_is_set() {
        let config = ProcessorConfig::from_lookup(lookup(&[("STATUS_TABLE_NAME", "jobs")])).unwrap();

        assert_eq!(config.store.table_name, "jobs");
        assert_eq!(config.store.key_attribute, "jobId");
        assert_eq!(config.store.region, "us-east-1");
        assert_eq!(config.store.semantics, UpdateSemantics::Upsert);
        assert_eq!(config.task_duration, Duration::from_secs(10));
    }

    #[test]
    fn falls_back_to_table_name() {
        let config = ProcessorConfig::from_lookup(lookup(&[("TABLE_NAME", "legacy")])).unwrap();
        assert_eq!(config.store.table_name, "legacy");
    }

    #[test]
    fn table_name_is_required() {
        let err = ProcessorConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("STATUS_TABLE_NAME"));

        let err = ProcessorConfig::from_lookup(lookup(&[("STATUS_TABLE_NAME", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Blank { name: "STATUS_TABLE_NAME" });
    }

    #[test]
    fn overrides_are_read() {
        let config = ProcessorConfig::from_lookup(lookup(&[
            ("STATUS_TABLE_NAME", "jobs"),
            ("STATUS_KEY_ATTRIBUTE", "id"),
            ("AWS_REGION", "eu-west-1"),
            ("STATUS_REQUIRE_EXISTING", "true"),
            ("EXPORT_TASK_DURATION_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.store.key_attribute, "id");
        assert_eq!(config.store.region, "eu-west-1");
        assert_eq!(config.store.semantics, UpdateSemantics::ExistingOnly);
        assert_eq!(config.task_duration, Duration::from_millis(250));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = ProcessorConfig::from_lookup(lookup(&[
            ("STATUS_TABLE_NAME", "jobs"),
            ("EXPORT_TASK_DURATION_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "EXPORT_TASK_DURATION_MS", .. }));

        let err = ProcessorConfig::from_lookup(lookup(&[
            ("STATUS_TABLE_NAME", "jobs"),
            ("STATUS_REQUIRE_EXISTING", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "STATUS_REQUIRE_EXISTING", .. }));
    }
}
