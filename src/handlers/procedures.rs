//! # Procedures
//!
//! Procedures are served twice: as RPC calls under `/rpc/<name>` and as REST
//! routes under `/api/<kebab-name>`. Access tiers are applied by the router.

use axum::response::Json;

use crate::access::TenantMember;
use crate::error::ApiError;
use crate::handlers::types::PrivateDataResponse;

/// Public liveness procedure
#[utoipa::path(
    get,
    path = "/api/health-check",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "procedures"
)]
pub async fn health_check() -> Json<&'static str> {
    Json("OK")
}

/// Tenant-scoped procedure returning the caller's tenant and membership
#[utoipa::path(
    get,
    path = "/api/private-data",
    params(
        ("x-tenant-id" = Option<String>, Header, description = "Tenant ID"),
        ("x-tenant-slug" = Option<String>, Header, description = "Tenant slug")
    ),
    responses(
        (status = 200, description = "Private tenant data", body = PrivateDataResponse),
        (status = 400, description = "No tenant identified", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 403, description = "Not a member of the tenant", body = ApiError)
    ),
    tag = "procedures"
)]
pub async fn private_data(member: TenantMember) -> Json<PrivateDataResponse> {
    tracing::debug!(
        tenant_id = %member.tenant.id,
        role = member.membership.role.as_str(),
        "Serving private data"
    );

    Json(PrivateDataResponse {
        message: "This is private".to_string(),
        user: member.session.user.clone().into(),
        tenant: member.tenant.into(),
        tenant_membership: member.membership.into(),
    })
}
