//! Statement workflow: create, process and query statement jobs.
//!
//! `create` runs on the request path and only persists the Pending record and
//! hands processing to the [`StatementExecutor`]. The worker task that picks
//! the job up owns it until it reaches a terminal state. The tenant travels
//! into the task by value; nothing in here reads request-scoped state.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, info_span, warn};

use banking_core::{AccountId, DomainError, TenantId};
use banking_statements::{StatementEngine, StatementWindow};

use crate::jobs::executor::panic_message;
use crate::jobs::{
    ExecutorError, JobId, JobStatus, JobStore, JobStoreError, JobTransitionError, StatementExecutor,
    StatementJob,
};
use crate::ledger_store::{LedgerStore, LedgerStoreError};

/// Request for a statement over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRequest {
    pub account_id: AccountId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Workflow error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// Account or job absent, or owned by another tenant.
    #[error("not found")]
    NotFound,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("statement queue is at capacity")]
    CapacityExceeded,
    /// Only ever recorded on a Failed job.
    #[error("{0}")]
    ProcessingFailure(String),
    #[error("storage error: {0}")]
    Store(String),
}

impl From<DomainError> for WorkflowError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::InvalidRequest(msg),
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}

impl From<LedgerStoreError> for WorkflowError {
    fn from(err: LedgerStoreError) -> Self {
        match err {
            LedgerStoreError::AccountNotFound(_) => Self::NotFound,
            LedgerStoreError::Domain(e) => e.into(),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<JobStoreError> for WorkflowError {
    fn from(err: JobStoreError) -> Self {
        match err {
            JobStoreError::NotFound(_) => Self::NotFound,
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<JobTransitionError> for WorkflowError {
    fn from(err: JobTransitionError) -> Self {
        Self::ProcessingFailure(err.to_string())
    }
}

/// Everything a worker task needs, cloned into each task.
#[derive(Clone)]
struct StatementProcessor<L, J> {
    ledger: L,
    jobs: J,
    engine: StatementEngine,
}

impl<L, J> StatementProcessor<L, J>
where
    L: LedgerStore,
    J: JobStore,
{
    /// Task entry point. Never panics and never returns an error to the pool.
    fn run(&self, job_id: JobId, tenant_id: TenantId) {
        let span = info_span!("statement_job", job_id = %job_id, tenant_id = %tenant_id);
        let _entered = span.enter();

        match panic::catch_unwind(AssertUnwindSafe(|| self.process(job_id, &tenant_id))) {
            Ok(Ok(())) => {}
            Ok(Err(WorkflowError::NotFound)) => {
                error!("statement job vanished before processing; dropping task");
            }
            Ok(Err(err)) => {
                error!(error = %err, "statement job could not be processed");
                self.fail_job(job_id, &tenant_id, &err);
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, "statement generation panicked");
                self.fail_job(
                    job_id,
                    &tenant_id,
                    format!("statement generation panicked: {message}"),
                );
            }
        }
    }

    fn process(&self, job_id: JobId, tenant_id: &TenantId) -> Result<(), WorkflowError> {
        let mut job = self
            .jobs
            .get_for_tenant(job_id, tenant_id)?
            .ok_or(WorkflowError::NotFound)?;

        if job.status() != JobStatus::Pending {
            debug!(status = %job.status(), "job already picked up; skipping");
            return Ok(());
        }

        job.mark_processing()?;
        self.jobs.update(&job)?;

        match self.render(&job) {
            Ok(statement) => {
                job.mark_completed(statement, Utc::now())?;
                info!(account_id = %job.account_id(), "statement completed");
            }
            Err(err) => {
                warn!(account_id = %job.account_id(), error = %err, "statement failed");
                job.mark_failed(&err, Utc::now())?;
            }
        }

        self.jobs.update(&job)?;
        Ok(())
    }

    fn render(&self, job: &StatementJob) -> Result<String, WorkflowError> {
        let window = job.window();
        let snapshot = self
            .ledger
            .statement_snapshot(job.account_id(), job.tenant_id(), &window)?
            .ok_or_else(|| {
                WorkflowError::ProcessingFailure(format!("account not found: {}", job.account_id()))
            })?;

        Ok(self
            .engine
            .generate(&snapshot.account, window, &snapshot.transactions)
            .render())
    }

    /// Move a non-terminal job to Failed. Errors are logged, not returned.
    fn fail_job(&self, job_id: JobId, tenant_id: &TenantId, reason: impl std::fmt::Display) {
        if let Err(err) = self.try_fail_job(job_id, tenant_id, reason) {
            error!(job_id = %job_id, error = %err, "could not record job failure");
        }
    }

    fn try_fail_job(
        &self,
        job_id: JobId,
        tenant_id: &TenantId,
        reason: impl std::fmt::Display,
    ) -> Result<(), WorkflowError> {
        let mut job = self
            .jobs
            .get_for_tenant(job_id, tenant_id)?
            .ok_or(WorkflowError::NotFound)?;

        if job.status().is_terminal() {
            return Ok(());
        }

        job.mark_failed(reason, Utc::now())?;
        self.jobs.update(&job)?;
        Ok(())
    }
}

/// Statement job lifecycle over injected stores and a shared worker pool.
pub struct StatementWorkflow<L, J> {
    processor: StatementProcessor<L, J>,
    executor: Arc<StatementExecutor>,
}

impl<L: Clone, J: Clone> Clone for StatementWorkflow<L, J> {
    fn clone(&self) -> Self {
        Self {
            processor: self.processor.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<L, J> StatementWorkflow<L, J>
where
    L: LedgerStore + Clone + 'static,
    J: JobStore + Clone + 'static,
{
    pub fn new(ledger: L, jobs: J, executor: Arc<StatementExecutor>) -> Self {
        Self {
            processor: StatementProcessor {
                ledger,
                jobs,
                engine: StatementEngine,
            },
            executor,
        }
    }

    pub fn executor(&self) -> &Arc<StatementExecutor> {
        &self.executor
    }

    /// Persist a Pending job and schedule it.
    ///
    /// The returned job is the Pending record; processing happens later on a
    /// pool thread. An unknown or foreign account fails with `NotFound`
    /// before anything is written.
    pub fn create(
        &self,
        tenant_id: &TenantId,
        request: StatementRequest,
    ) -> Result<StatementJob, WorkflowError> {
        let window = StatementWindow::from_dates(request.start_date, request.end_date)?;

        if self
            .processor
            .ledger
            .find_account(&request.account_id, tenant_id)?
            .is_none()
        {
            return Err(WorkflowError::NotFound);
        }

        let job = StatementJob::new(request.account_id, tenant_id.clone(), window, Utc::now());
        let job_id = self.processor.jobs.create(job.clone())?;

        info!(
            job_id = %job_id,
            tenant_id = %tenant_id,
            account_id = %job.account_id(),
            "statement job created"
        );

        let processor = self.processor.clone();
        let task_tenant = tenant_id.clone();
        let submitted = self
            .executor
            .submit(Box::new(move || processor.run(job_id, task_tenant)));

        if let Err(err) = submitted {
            warn!(job_id = %job_id, error = %err, "statement job rejected by worker pool");
            let reason = match err {
                ExecutorError::CapacityExceeded { .. } => WorkflowError::CapacityExceeded.to_string(),
                other => other.to_string(),
            };
            self.processor.fail_job(job_id, tenant_id, reason);
            return Err(WorkflowError::CapacityExceeded);
        }

        Ok(job)
    }

    /// Current state of a job owned by `tenant_id`.
    pub fn query(&self, job_id: JobId, tenant_id: &TenantId) -> Result<StatementJob, WorkflowError> {
        self.processor
            .jobs
            .get_for_tenant(job_id, tenant_id)?
            .ok_or(WorkflowError::NotFound)
    }

    pub fn list(
        &self,
        tenant_id: &TenantId,
        status: Option<JobStatus>,
        limit: usize,
    ) -> Result<Vec<StatementJob>, WorkflowError> {
        Ok(self.processor.jobs.list_for_tenant(tenant_id, status, limit)?)
    }
}
