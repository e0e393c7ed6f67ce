use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use banking_core::AccountId;
use banking_infra::jobs::{JobId, JobStatus};
use banking_infra::StatementRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::TenantContext;

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 500;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_statements).post(request_statement))
        .route("/:job_id", get(get_statement))
}

/// Accept a statement request; generation continues in the background.
pub async fn request_statement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    body: Result<Json<dto::StatementRequestBody>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let account_id = match AccountId::parse(body.account_id) {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let request = StatementRequest {
        account_id,
        start_date: body.start_date,
        end_date: body.end_date,
    };

    match services.statements.create(tenant.tenant_id(), request) {
        Ok(job) => (
            StatusCode::ACCEPTED,
            Json(dto::StatementAccepted::from_job(&job)),
        )
            .into_response(),
        Err(e) => errors::workflow_error_to_response(e, "Account not found"),
    }
}

pub async fn get_statement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(job_id): Path<String>,
) -> axum::response::Response {
    // A malformed id cannot name any job.
    let Ok(job_id) = job_id.parse::<JobId>() else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "Job not found");
    };

    match services.statements.query(job_id, tenant.tenant_id()) {
        Ok(job) => (StatusCode::OK, Json(dto::StatementJobResponse::from(&job))).into_response(),
        Err(e) => errors::workflow_error_to_response(e, "Job not found"),
    }
}

pub async fn list_statements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    query: Result<Query<dto::ListStatementsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection_to_response(e),
    };

    let status = match query.status.as_deref().map(str::parse::<JobStatus>).transpose() {
        Ok(s) => s,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_status", msg),
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);

    match services.statements.list(tenant.tenant_id(), status, limit) {
        Ok(jobs) => {
            let items = jobs
                .iter()
                .map(dto::StatementJobResponse::from)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::workflow_error_to_response(e, "Job not found"),
    }
}
