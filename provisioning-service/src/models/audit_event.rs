//! Audit event model - append-only provisioning trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Audit action codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    UserProvisioned,
    BulkImportCompleted,
    TenantBootstrapped,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserProvisioned => "user_provisioned",
            AuditAction::BulkImportCompleted => "bulk_import_completed",
            AuditAction::TenantBootstrapped => "tenant_bootstrapped",
        }
    }
}

/// Audit event entity. Inserted once, never updated or deleted.
#[derive(Debug, Clone, FromRow)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub actor_user_id: Option<Uuid>,
    pub action_code: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
    pub created_utc: DateTime<Utc>,
}

impl AuditEvent {
    /// Record an action performed by an authenticated actor within a tenant.
    pub fn actor_action(
        tenant_id: Uuid,
        actor_user_id: Uuid,
        action: AuditAction,
        entity_type: Option<String>,
        entity_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            tenant_id: Some(tenant_id),
            actor_user_id: Some(actor_user_id),
            action_code: action.as_str().to_string(),
            entity_type,
            entity_id,
            metadata,
            created_utc: Utc::now(),
        }
    }
}
