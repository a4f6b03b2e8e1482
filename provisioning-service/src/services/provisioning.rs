//! Batch orchestrator and per-row side-effect pipeline.
//!
//! Rows are processed one at a time, in input order. The identity lookup
//! walks shared provider state, so there is no intra-batch parallelism.
//! Rows are independent past the validation gate: a failed row never stops
//! the rows after it, and nothing rolls back the steps a failed row already
//! applied. Every step is an upsert, so re-submitting a fixed row converges.

use std::sync::Arc;

use service_core::error::AppError;
use uuid::Uuid;

use super::error::ProvisionError;
use super::{
    validate_row, Database, IdentityProvider, IdentityResolver, PermissionGate,
};
use crate::models::{
    AuditAction, AuditEvent, DirectoryEntry, ImportMode, ImportRow, Membership, RowResult,
    Tenant, MAX_BATCH_ROWS,
};

/// Aggregated outcome of one batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    /// True when every row validated (dry run) or fully applied (commit).
    pub ok: bool,
    pub results: Vec<RowResult>,
    /// Commit refused at the validation gate: no side effect was attempted
    /// for any row.
    pub refused_at_validation: bool,
}

/// Drives dry-run and commit over a batch of import rows.
#[derive(Clone)]
pub struct ProvisioningService {
    db: Database,
    gate: PermissionGate,
    resolver: IdentityResolver,
    provider: Arc<dyn IdentityProvider>,
}

impl ProvisioningService {
    pub fn new(db: Database, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            gate: PermissionGate::new(db.clone()),
            resolver: IdentityResolver::new(provider.clone()),
            db,
            provider,
        }
    }

    /// Run one batch for a tenant on behalf of an actor.
    ///
    /// Fatal conditions (bad batch shape, denied permission) surface as
    /// `AppError` with no partial results. Row-level failures during commit
    /// are captured per row and never abort the batch.
    #[tracing::instrument(
        skip(self, tenant, rows),
        fields(tenant_slug = %tenant.tenant_slug, mode = mode.as_str(), rows = rows.len())
    )]
    pub async fn run_batch(
        &self,
        actor_id: Uuid,
        tenant: &Tenant,
        mode: ImportMode,
        rows: Vec<ImportRow>,
        reason: Option<String>,
    ) -> Result<BatchOutcome, AppError> {
        if rows.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "At least one row is required"
            )));
        }
        if rows.len() > MAX_BATCH_ROWS {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Batch exceeds the maximum of {} rows",
                MAX_BATCH_ROWS
            )));
        }

        self.gate.authorize(actor_id, tenant.tenant_id).await?;

        // Re-validated on every call, commit included: a prior dry-run result
        // is never trusted.
        let mut results: Vec<RowResult> = rows.iter().map(validate_row).collect();
        let all_valid = results.iter().all(|r| r.ok);

        if mode == ImportMode::DryRun {
            return Ok(BatchOutcome {
                ok: all_valid,
                results,
                refused_at_validation: false,
            });
        }

        if !all_valid {
            tracing::info!("Commit refused at validation gate");
            return Ok(BatchOutcome {
                ok: false,
                results,
                refused_at_validation: true,
            });
        }

        let mut users_created = 0usize;
        for (row, result) in rows.iter().zip(results.iter_mut()) {
            match self.commit_row(actor_id, tenant, row, result).await {
                Ok(created) => {
                    if created {
                        users_created += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(row = row.row_number, error = %e, "Row failed");
                    result.fail(e.to_string());
                }
            }
        }

        let rows_succeeded = results.iter().filter(|r| r.ok).count();
        let rows_failed = results.len() - rows_succeeded;

        // The caller's stated justification belongs in the append-only trail,
        // not just the logs.
        let mut metadata = serde_json::json!({
            "rows_processed": results.len(),
            "users_created": users_created,
            "rows_succeeded": rows_succeeded,
            "rows_failed": rows_failed,
        });
        if let Some(reason) = &reason {
            metadata["reason"] = serde_json::json!(reason);
        }

        let summary = AuditEvent::actor_action(
            tenant.tenant_id,
            actor_id,
            AuditAction::BulkImportCompleted,
            Some("import_batch".to_string()),
            None,
            Some(metadata),
        );
        if let Err(e) = self.db.insert_audit_event(&summary).await {
            // Rows are already applied; losing the per-row report to a summary
            // write failure would misreport the batch.
            tracing::error!(error = %e, "Failed to write batch audit record");
        }

        Ok(BatchOutcome {
            ok: rows_failed == 0,
            results,
            refused_at_validation: false,
        })
    }

    /// Apply one valid row: resolve identity, then the ordered side effects.
    ///
    /// Steps, stop on first failure, later steps not attempted:
    /// password -> membership -> role replacement -> directory -> audit.
    /// Returns whether the identity was newly created.
    async fn commit_row(
        &self,
        actor_id: Uuid,
        tenant: &Tenant,
        row: &ImportRow,
        result: &mut RowResult,
    ) -> Result<bool, ProvisionError> {
        let email = row.email.trim();
        let resolved = self.resolver.resolve(email, &row.password).await?;
        result.user_id = Some(resolved.user_id);

        // Imports are authoritative over credentials: an existing account gets
        // the row's password. A just-created account already has it.
        if !resolved.created {
            self.provider
                .set_password(resolved.user_id, &row.password)
                .await?;
        }

        self.db
            .upsert_membership(&Membership::new(tenant.tenant_id, resolved.user_id))
            .await?;

        self.db
            .replace_role_grants(tenant.tenant_id, resolved.user_id, &result.normalized_roles)
            .await?;

        self.db
            .upsert_directory_entry(&DirectoryEntry::new(
                tenant.tenant_id,
                resolved.user_id,
                email.to_string(),
                row.display_name.clone(),
                row.phone.clone(),
            ))
            .await?;

        let roles: Vec<&str> = result.normalized_roles.iter().map(|r| r.as_str()).collect();
        self.db
            .insert_audit_event(&AuditEvent::actor_action(
                tenant.tenant_id,
                actor_id,
                AuditAction::UserProvisioned,
                Some("user".to_string()),
                Some(resolved.user_id),
                Some(serde_json::json!({
                    "email": email,
                    "roles": roles,
                    "created": resolved.created,
                })),
            ))
            .await?;

        Ok(resolved.created)
    }
}
