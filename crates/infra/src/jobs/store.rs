//! Job status storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, error};

use exportq_core::{JobId, JobStatus, PersistenceError};

/// What an update does when the job's key is not in the store yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateSemantics {
    /// Create a record holding only the key and status.
    #[default]
    Upsert,
    /// Reject the update; only existing records are modified.
    ExistingOnly,
}

/// Key-value status store abstraction.
pub trait StatusStore: Send + Sync {
    /// Set the `status` field of the record keyed by `job_id`.
    fn upsert_status(&self, job_id: &JobId, status: JobStatus) -> Result<(), PersistenceError>;
}

impl<S: StatusStore + ?Sized> StatusStore for Arc<S> {
    fn upsert_status(&self, job_id: &JobId, status: JobStatus) -> Result<(), PersistenceError> {
        (**self).upsert_status(job_id, status)
    }
}

/// Writes job outcomes through a [`StatusStore`].
///
/// The store handle is created once and reused for every message.
#[derive(Debug)]
pub struct StatusRecorder<S: StatusStore> {
    store: S,
}

impl<S: StatusStore> StatusRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn record_status(&self, job_id: &JobId, status: JobStatus) -> Result<(), PersistenceError> {
        match self.store.upsert_status(job_id, status) {
            Ok(()) => {
                debug!(job_id = %job_id, status = %status, "job status recorded");
                Ok(())
            }
            Err(e) => {
                error!(job_id = %job_id, status = %status, error = %e, "failed to record job status");
                Err(e)
            }
        }
    }
}

/// In-memory status store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    records: RwLock<HashMap<JobId, Option<JobStatus>>>,
    semantics: UpdateSemantics,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_semantics(semantics: UpdateSemantics) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            semantics,
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert a record with no status yet, as an upstream producer would.
    pub fn seed(&self, job_id: JobId) -> Result<(), PersistenceError> {
        self.write()?.entry(job_id).or_insert(None);
        Ok(())
    }

    /// Whether a record exists for `job_id`, with or without a status.
    pub fn contains(&self, job_id: &JobId) -> bool {
        self.records
            .read()
            .map(|r| r.contains_key(job_id))
            .unwrap_or(false)
    }

    /// Current status of `job_id`, if a record exists and has one.
    pub fn status(&self, job_id: &JobId) -> Option<JobStatus> {
        self.records
            .read()
            .ok()
            .and_then(|r| r.get(job_id).copied().flatten())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<JobId, Option<JobStatus>>>, PersistenceError>
    {
        self.records
            .write()
            .map_err(|_| PersistenceError::unavailable("status store lock poisoned"))
    }
}

impl StatusStore for InMemoryStatusStore {
    fn upsert_status(&self, job_id: &JobId, status: JobStatus) -> Result<(), PersistenceError> {
        let mut records = self.write()?;
        if let Some(existing) = records.get_mut(job_id) {
            *existing = Some(status);
            return Ok(());
        }

        match self.semantics {
            UpdateSemantics::Upsert => {
                records.insert(job_id.clone(), Some(status));
                Ok(())
            }
            UpdateSemantics::ExistingOnly => Err(PersistenceError::rejected(
                job_id,
                "no record exists for key",
            )),
        }
    }
}
