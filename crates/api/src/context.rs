use banking_core::TenantId;

/// Tenant context for a request.
///
/// Inserted by `tenant_middleware`; must be present for all tenant routes.
/// Background work never reads it: handlers pass the `TenantId` on by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}
