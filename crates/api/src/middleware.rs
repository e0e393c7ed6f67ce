use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use banking_core::TenantId;

use crate::app::errors;
use crate::context::TenantContext;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Resolve the tenant from `X-Tenant-Id` and attach a [`TenantContext`].
pub async fn tenant_middleware(mut req: Request<Body>, next: Next) -> Response {
    let Some(tenant_id) = extract_tenant(req.headers()) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "missing_tenant",
            "Missing or invalid X-Tenant-Id header",
        );
    };

    req.extensions_mut().insert(TenantContext::new(tenant_id));
    next.run(req).await
}

fn extract_tenant(headers: &HeaderMap) -> Option<TenantId> {
    let value = headers.get(TENANT_HEADER)?.to_str().ok()?;
    TenantId::parse(value).ok()
}
