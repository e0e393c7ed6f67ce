use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use banking_core::DomainError;
use banking_infra::{LedgerStoreError, WorkflowError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InsufficientFunds => {
            json_error(StatusCode::BAD_REQUEST, "insufficient_funds", "Insufficient balance")
        }
    }
}

pub fn ledger_error_to_response(err: LedgerStoreError) -> axum::response::Response {
    match err {
        LedgerStoreError::AccountNotFound(_) => account_not_found(),
        LedgerStoreError::AlreadyExists(id) => json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!("account {id} already exists"),
        ),
        LedgerStoreError::Domain(e) => domain_error_to_response(e),
        LedgerStoreError::Storage(msg) => {
            tracing::error!(error = %msg, "ledger store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

/// Map a workflow error; `not_found` is the message for `NotFound`, which
/// differs between job lookups and statement requests.
pub fn workflow_error_to_response(
    err: WorkflowError,
    not_found: &'static str,
) -> axum::response::Response {
    match err {
        WorkflowError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", not_found),
        WorkflowError::InvalidRequest(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_request", msg)
        }
        WorkflowError::CapacityExceeded => {
            let mut res = json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "capacity_exceeded",
                "Statement queue is full, retry later",
            );
            res.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
            res
        }
        WorkflowError::ProcessingFailure(msg) | WorkflowError::Store(msg) => {
            tracing::error!(error = %msg, "statement workflow failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn account_not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "Account not found")
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text())
}
