//! Core job types and lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use banking_core::{AccountId, TenantId};
use banking_statements::StatementWindow;

/// Unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Job execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Persisted, waiting for a worker
    Pending,
    /// A worker is generating the statement
    Processing,
    /// Statement text is available
    Completed,
    /// Generation failed; the result holds the error
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(JobStatus::Pending),
            "PROCESSING" => Ok(JobStatus::Processing),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// Attempted a transition the lifecycle does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal job transition from {from} to {to}")]
pub struct JobTransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// A statement generation job.
///
/// Identity, ownership and window are fixed at creation; only the lifecycle
/// methods below change the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementJob {
    id: JobId,
    account_id: AccountId,
    tenant_id: TenantId,
    window: StatementWindow,
    status: JobStatus,
    result: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl StatementJob {
    /// Create a new pending job.
    pub fn new(
        account_id: AccountId,
        tenant_id: TenantId,
        window: StatementWindow,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: JobId::new(),
            account_id,
            tenant_id,
            window,
            status: JobStatus::Pending,
            result: None,
            created_at: now,
            completed_at: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn window(&self) -> StatementWindow {
        self.window
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Statement text or error description; `None` until terminal.
    pub fn result(&self) -> Option<&str> {
        if self.status.is_terminal() {
            self.result.as_deref()
        } else {
            None
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Pending -> Processing.
    pub fn mark_processing(&mut self) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Processing, &[JobStatus::Pending])
    }

    /// Processing -> Completed, storing the rendered statement.
    pub fn mark_completed(
        &mut self,
        statement: String,
        now: DateTime<Utc>,
    ) -> Result<(), JobTransitionError> {
        self.transition(JobStatus::Completed, &[JobStatus::Processing])?;
        self.result = Some(statement);
        self.completed_at = Some(now);
        Ok(())
    }

    /// Pending | Processing -> Failed, storing a readable error.
    pub fn mark_failed(
        &mut self,
        error: impl std::fmt::Display,
        now: DateTime<Utc>,
    ) -> Result<(), JobTransitionError> {
        self.transition(
            JobStatus::Failed,
            &[JobStatus::Pending, JobStatus::Processing],
        )?;
        self.result = Some(format!("Error: {error}"));
        self.completed_at = Some(now);
        Ok(())
    }

    fn transition(&mut self, to: JobStatus, allowed_from: &[JobStatus]) -> Result<(), JobTransitionError> {
        if !allowed_from.contains(&self.status) {
            return Err(JobTransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_job() -> StatementJob {
        let window = StatementWindow::from_dates(
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
        )
        .unwrap();
        StatementJob::new(
            AccountId::parse("A123").unwrap(),
            TenantId::parse("BANK001").unwrap(),
            window,
            Utc::now(),
        )
    }

    #[test]
    fn job_lifecycle() {
        let mut job = test_job();
        assert_eq!(job.status(), JobStatus::Pending);
        assert!(job.result().is_none());
        assert!(job.completed_at().is_none());

        job.mark_processing().unwrap();
        assert_eq!(job.status(), JobStatus::Processing);
        assert!(job.completed_at().is_none());

        job.mark_completed("statement".to_string(), Utc::now()).unwrap();
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.result(), Some("statement"));
        assert!(job.completed_at().is_some());
    }

    #[test]
    fn failure_allowed_from_pending_and_processing() {
        let mut pending = test_job();
        pending.mark_failed("boom", Utc::now()).unwrap();
        assert_eq!(pending.status(), JobStatus::Failed);
        assert_eq!(pending.result(), Some("Error: boom"));

        let mut processing = test_job();
        processing.mark_processing().unwrap();
        processing.mark_failed("account not found", Utc::now()).unwrap();
        assert_eq!(processing.result(), Some("Error: account not found"));
    }

    #[test]
    fn terminal_states_do_not_move() {
        let mut job = test_job();
        job.mark_processing().unwrap();
        job.mark_completed("done".to_string(), Utc::now()).unwrap();
        let stamped = job.completed_at();

        assert_eq!(
            job.mark_processing(),
            Err(JobTransitionError { from: JobStatus::Completed, to: JobStatus::Processing })
        );
        assert!(job.mark_failed("late", Utc::now()).is_err());
        assert_eq!(job.result(), Some("done"));
        assert_eq!(job.completed_at(), stamped);
    }

    #[test]
    fn completion_requires_processing() {
        let mut job = test_job();
        assert!(job.mark_completed("skip".to_string(), Utc::now()).is_err());
        assert_eq!(job.status(), JobStatus::Pending);
    }

    #[test]
    fn status_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&JobStatus::Processing).unwrap(), "\"PROCESSING\"");
        assert_eq!("completed".parse::<JobStatus>().unwrap(), JobStatus::Completed);
        assert!("done".parse::<JobStatus>().is_err());
    }
}
