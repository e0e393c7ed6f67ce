use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use banking_core::AccountId;
use banking_infra::LedgerStore;
use banking_ledger::{Account, TransactionKind};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route(
            "/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/:id/transactions", get(list_transactions).post(create_transaction))
}

pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    body: Result<Json<dto::AccountRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    let account = match Account::open(
        AccountId::generate(),
        tenant.tenant_id().clone(),
        body.customer_name,
        body.balance,
        Utc::now(),
    ) {
        Ok(a) => a,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.ledger.insert_account(account.clone()) {
        return errors::ledger_error_to_response(e);
    }

    tracing::info!(tenant_id = %tenant.tenant_id(), account_id = %account.id, "account created");
    (StatusCode::CREATED, Json(account)).into_response()
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    match services.ledger.list_accounts(tenant.tenant_id()) {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(account_id) = AccountId::parse(id) else {
        return errors::account_not_found();
    };

    match services.ledger.find_account(&account_id, tenant.tenant_id()) {
        Ok(Some(account)) => (StatusCode::OK, Json(account)).into_response(),
        Ok(None) => errors::account_not_found(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn update_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::AccountRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let Ok(account_id) = AccountId::parse(id) else {
        return errors::account_not_found();
    };

    match services.ledger.update_account(
        &account_id,
        tenant.tenant_id(),
        &body.customer_name,
        body.balance,
    ) {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(account_id) = AccountId::parse(id) else {
        return errors::account_not_found();
    };

    match services.ledger.delete_account(&account_id, tenant.tenant_id()) {
        Ok(()) => {
            tracing::info!(tenant_id = %tenant.tenant_id(), account_id = %account_id, "account deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::TransactionRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let Ok(account_id) = AccountId::parse(id) else {
        return errors::account_not_found();
    };
    let kind: TransactionKind = match body.kind.parse() {
        Ok(k) => k,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.record_transaction(
        &account_id,
        tenant.tenant_id(),
        kind,
        body.amount,
        Utc::now(),
    ) {
        Ok(tx) => {
            tracing::info!(
                tenant_id = %tenant.tenant_id(),
                account_id = %account_id,
                kind = %kind,
                "transaction recorded"
            );
            (StatusCode::CREATED, Json(tx)).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(account_id) = AccountId::parse(id) else {
        return errors::account_not_found();
    };

    match services.ledger.list_transactions(&account_id, tenant.tenant_id()) {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
