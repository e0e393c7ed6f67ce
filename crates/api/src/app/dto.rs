use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use banking_infra::jobs::{JobStatus, StatementJob};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /accounts` and `PUT /accounts/:id`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub customer_name: String,
    pub balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    /// `DEPOSIT` or `WITHDRAWAL`, any case.
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRequestBody {
    pub account_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListStatementsQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementAccepted {
    pub job_id: String,
    pub status: JobStatus,
    pub message: &'static str,
}

impl StatementAccepted {
    pub fn from_job(job: &StatementJob) -> Self {
        Self {
            job_id: job.id().to_string(),
            status: job.status(),
            message: "Statement generation started",
        }
    }
}

/// Job as seen by its owner; `result` only once terminal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementJobResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub account_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl From<&StatementJob> for StatementJobResponse {
    fn from(job: &StatementJob) -> Self {
        Self {
            job_id: job.id().to_string(),
            status: job.status(),
            account_id: job.account_id().to_string(),
            window_start: job.window().start(),
            window_end: job.window().end(),
            created_at: job.created_at(),
            completed_at: job.completed_at(),
            result: job.result().map(str::to_string),
        }
    }
}
