//! Tenant bootstrap handler: create a school and provision its owner in one
//! call. Platform super-administrators only.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::{
    AuditAction, AuditEvent, ImportMode, ImportRow, ImportRowRequest, RowResult, Tenant,
    TenantResponse,
};
use crate::services::validate_row;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize, Validate)]
pub struct BootstrapRequest {
    #[validate(length(min = 1, max = 64))]
    pub tenant_slug: String,
    #[validate(length(min = 1, max = 120))]
    pub tenant_label: String,
    pub owner: ImportRowRequest,
}

#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    pub ok: bool,
    pub tenant: TenantResponse,
    pub results: Vec<RowResult>,
}

/// Create a tenant and provision its owner account.
///
/// POST /provisioning/tenants/bootstrap
#[tracing::instrument(skip(state, claims, req), fields(actor = %claims.sub, tenant_slug = %req.tenant_slug))]
pub async fn bootstrap_tenant(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<BootstrapRequest>,
) -> Result<Response, AppError> {
    let actor_id = super::parse_actor_id(&claims)?;

    if !state.db.is_platform_admin(actor_id).await? {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Only platform administrators may bootstrap tenants"
        )));
    }

    req.validate()?;
    super::ensure_valid_slug(&req.tenant_slug)?;

    if state
        .db
        .find_tenant_by_slug(&req.tenant_slug)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "A tenant with this slug already exists"
        )));
    }

    // The owner grant is what makes the tenant administrable afterwards.
    let mut owner = req.owner;
    if !owner.roles.iter().any(|r| r.trim().eq_ignore_ascii_case("owner")) {
        owner.roles.push("owner".to_string());
    }
    let owner_row = ImportRow::from_request(0, owner);

    // Validate before creating the tenant so a bad owner record leaves no
    // half-bootstrapped school behind.
    let precheck = validate_row(&owner_row);
    if !precheck.ok {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Owner record is invalid",
                "results": [precheck],
            })),
        )
            .into_response());
    }

    let tenant = Tenant::new(req.tenant_slug.clone(), req.tenant_label.clone());
    state.db.insert_tenant(&tenant).await?;

    state
        .db
        .insert_audit_event(&AuditEvent::actor_action(
            tenant.tenant_id,
            actor_id,
            AuditAction::TenantBootstrapped,
            Some("tenant".to_string()),
            Some(tenant.tenant_id),
            Some(serde_json::json!({ "tenant_slug": tenant.tenant_slug })),
        ))
        .await?;

    let outcome = state
        .provisioning
        .run_batch(actor_id, &tenant, ImportMode::Commit, vec![owner_row], None)
        .await?;

    tracing::info!(
        tenant_id = %tenant.tenant_id,
        owner_ok = outcome.ok,
        "Tenant bootstrapped"
    );

    Ok((
        StatusCode::CREATED,
        Json(BootstrapResponse {
            ok: outcome.ok,
            tenant: tenant.into(),
            results: outcome.results,
        }),
    )
        .into_response())
}
