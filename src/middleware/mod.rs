use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::models::TenantId;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// Tenant of the current request, resolved upstream and passed in `X-Tenant-Id`.
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub TenantId);

impl CurrentTenant {
    pub fn current_tenant(&self) -> &TenantId {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or((StatusCode::BAD_REQUEST, "X-Tenant-Id header is required"))?;

        Ok(CurrentTenant(TenantId::new(tenant)))
    }
}
