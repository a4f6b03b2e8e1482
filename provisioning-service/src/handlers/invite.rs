//! Single invite handler: one record through the bulk commit contract.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::middleware::AuthUser;
use crate::models::{ImportMode, ImportResponse, ImportRow, ImportRowRequest};
use crate::AppState;
use service_core::error::AppError;

/// Provision a single account for a tenant.
///
/// POST /provisioning/tenants/{slug}/invite
#[tracing::instrument(skip(state, claims, req), fields(tenant_slug = %slug, actor = %claims.sub))]
pub async fn invite_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(slug): Path<String>,
    Json(req): Json<ImportRowRequest>,
) -> Result<Response, AppError> {
    let actor_id = super::parse_actor_id(&claims)?;
    super::ensure_valid_slug(&slug)?;

    let tenant = state
        .db
        .find_tenant_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Tenant not found")))?;

    let rows = vec![ImportRow::from_request(0, req)];
    let outcome = state
        .provisioning
        .run_batch(actor_id, &tenant, ImportMode::Commit, rows, None)
        .await?;

    let status = if outcome.refused_at_validation {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ImportResponse {
            ok: outcome.ok,
            mode: ImportMode::Commit,
            results: outcome.results,
        }),
    )
        .into_response())
}
