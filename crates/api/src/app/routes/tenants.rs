//! Tenant-scoped resource routes.

use axum::{
    Extension, Json,
    extract::Path,
    response::{IntoResponse, Response},
};

use marketedge_auth::{AuthzError, Industry, Permission, TenantContext, authorize};
use marketedge_core::TenantId;

use crate::app::errors::{authz_error_response, domain_error_response};

/// Report catalog for a tenant. The authorization gate here is the pattern
/// every tenant-scoped route follows: parse the resource tenant, check it
/// against the token's context, then check the permission.
pub async fn reports(
    Extension(context): Extension<TenantContext>,
    Path(tenant_id): Path<String>,
) -> Response {
    let tenant: TenantId = match tenant_id.parse() {
        Ok(tenant) => tenant,
        Err(e) => return domain_error_response(&e),
    };

    if let Err(e) = authorize(&context, tenant, &Permission::new("reports.read")) {
        if e == AuthzError::TenantMismatch {
            tracing::warn!(
                request_tenant = %tenant,
                token_tenant = %context.tenant_id(),
                principal_id = %context.principal_id(),
                "cross-tenant access attempt denied"
            );
        }
        return authz_error_response(&e);
    }

    Json(serde_json::json!({
        "tenant_id": tenant.to_string(),
        "reports": catalog_for_industry(context.industry()),
    }))
    .into_response()
}

/// Which report templates a vertical gets by default.
fn catalog_for_industry(industry: &Industry) -> Vec<&'static str> {
    match industry.as_str() {
        "cinema" => vec!["daily-admissions", "competitor-pricing", "concession-mix"],
        "hotel" => vec!["occupancy-pace", "rate-shopping", "revpar-trend"],
        "gym" => vec!["membership-churn", "class-utilization"],
        "retail" => vec!["basket-analysis", "footfall-trend"],
        _ => vec!["market-overview"],
    }
}
