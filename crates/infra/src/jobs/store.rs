//! Job storage implementations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use banking_core::TenantId;

use super::types::{JobId, JobStatus, StatementJob};

/// Job store abstraction.
///
/// `update` is a full-record replace (last writer wins); callers rely on the
/// single-owner rule of the workflow rather than on store-level locking.
pub trait JobStore: Send + Sync {
    /// Persist a new job.
    fn create(&self, job: StatementJob) -> Result<JobId, JobStoreError>;

    /// Get a job by ID regardless of tenant.
    fn get(&self, job_id: JobId) -> Result<Option<StatementJob>, JobStoreError>;

    /// Get a job only if it belongs to `tenant_id`.
    ///
    /// A job owned by another tenant yields `Ok(None)`, exactly like an
    /// unknown ID.
    fn get_for_tenant(
        &self,
        job_id: JobId,
        tenant_id: &TenantId,
    ) -> Result<Option<StatementJob>, JobStoreError>;

    /// Replace a stored job.
    fn update(&self, job: &StatementJob) -> Result<(), JobStoreError>;

    /// List a tenant's jobs, oldest first, optionally filtered by status.
    fn list_for_tenant(
        &self,
        tenant_id: &TenantId,
        status: Option<JobStatus>,
        limit: usize,
    ) -> Result<Vec<StatementJob>, JobStoreError>;
}

/// Job store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobStoreError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job already exists: {0}")]
    AlreadyExists(JobId),
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Default)]
struct JobTable {
    jobs: HashMap<JobId, StatementJob>,
    /// Creation order per tenant.
    by_tenant: HashMap<TenantId, Vec<JobId>>,
}

/// In-memory job store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    inner: RwLock<JobTable>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, JobTable>, JobStoreError> {
        self.inner
            .read()
            .map_err(|_| JobStoreError::Storage("job table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, JobTable>, JobStoreError> {
        self.inner
            .write()
            .map_err(|_| JobStoreError::Storage("job table lock poisoned".to_string()))
    }
}

impl JobStore for InMemoryJobStore {
    fn create(&self, job: StatementJob) -> Result<JobId, JobStoreError> {
        let mut table = self.write()?;
        let id = job.id();
        if table.jobs.contains_key(&id) {
            return Err(JobStoreError::AlreadyExists(id));
        }
        table
            .by_tenant
            .entry(job.tenant_id().clone())
            .or_default()
            .push(id);
        table.jobs.insert(id, job);
        Ok(id)
    }

    fn get(&self, job_id: JobId) -> Result<Option<StatementJob>, JobStoreError> {
        let table = self.read()?;
        Ok(table.jobs.get(&job_id).cloned())
    }

    fn get_for_tenant(
        &self,
        job_id: JobId,
        tenant_id: &TenantId,
    ) -> Result<Option<StatementJob>, JobStoreError> {
        let table = self.read()?;
        Ok(table
            .jobs
            .get(&job_id)
            .filter(|job| job.tenant_id() == tenant_id)
            .cloned())
    }

    fn update(&self, job: &StatementJob) -> Result<(), JobStoreError> {
        let mut table = self.write()?;
        match table.jobs.get_mut(&job.id()) {
            // Ownership is immutable: a record can only replace its own tenant's job.
            Some(existing) if existing.tenant_id() == job.tenant_id() => {
                *existing = job.clone();
                Ok(())
            }
            _ => Err(JobStoreError::NotFound(job.id())),
        }
    }

    fn list_for_tenant(
        &self,
        tenant_id: &TenantId,
        status: Option<JobStatus>,
        limit: usize,
    ) -> Result<Vec<StatementJob>, JobStoreError> {
        let table = self.read()?;
        let Some(ids) = table.by_tenant.get(tenant_id) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| table.jobs.get(id))
            .filter(|job| status.map_or(true, |s| job.status() == s))
            .take(limit)
            .cloned()
            .collect())
    }
}

impl<S> JobStore for Arc<S>
where
    S: JobStore + ?Sized,
{
    fn create(&self, job: StatementJob) -> Result<JobId, JobStoreError> {
        (**self).create(job)
    }

    fn get(&self, job_id: JobId) -> Result<Option<StatementJob>, JobStoreError> {
        (**self).get(job_id)
    }

    fn get_for_tenant(
        &self,
        job_id: JobId,
        tenant_id: &TenantId,
    ) -> Result<Option<StatementJob>, JobStoreError> {
        (**self).get_for_tenant(job_id, tenant_id)
    }

    fn update(&self, job: &StatementJob) -> Result<(), JobStoreError> {
        (**self).update(job)
    }

    fn list_for_tenant(
        &self,
        tenant_id: &TenantId,
        status: Option<JobStatus>,
        limit: usize,
    ) -> Result<Vec<StatementJob>, JobStoreError> {
        (**self).list_for_tenant(tenant_id, status, limit)
    }
}
