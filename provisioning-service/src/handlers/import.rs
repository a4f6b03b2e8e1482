//! Bulk import handler: the superset provisioning contract.
//!
//! Dry-run validates and reports; commit re-validates, refuses the whole
//! batch if any row is invalid, and otherwise applies rows independently.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::middleware::AuthUser;
use crate::models::{ImportMode, ImportRequest, ImportResponse, ImportRow};
use crate::AppState;
use service_core::error::AppError;

/// Provision a batch of accounts for a tenant.
///
/// POST /provisioning/tenants/{slug}/import
#[tracing::instrument(skip(state, claims, req), fields(tenant_slug = %slug, actor = %claims.sub))]
pub async fn import_users(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(slug): Path<String>,
    Json(req): Json<ImportRequest>,
) -> Result<Response, AppError> {
    let actor_id = super::parse_actor_id(&claims)?;
    super::ensure_valid_slug(&slug)?;

    let tenant = state
        .db
        .find_tenant_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Tenant not found")))?;

    if let Some(reason) = &req.reason {
        tracing::info!(reason = %reason, "Import reason supplied");
    }

    let mode = req.mode;
    let rows: Vec<ImportRow> = req
        .rows
        .into_iter()
        .enumerate()
        .map(|(i, r)| ImportRow::from_request(i, r))
        .collect();

    let outcome = state
        .provisioning
        .run_batch(actor_id, &tenant, mode, rows, req.reason)
        .await?;

    // Commit refused at the validation gate is the one non-2xx that still
    // carries the full per-row report.
    let status = if mode == ImportMode::Commit && outcome.refused_at_validation {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ImportResponse {
            ok: outcome.ok,
            mode,
            results: outcome.results,
        }),
    )
        .into_response())
}
