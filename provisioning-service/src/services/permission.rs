//! Permission gate: may this actor provision accounts for this tenant?

use service_core::error::AppError;
use uuid::Uuid;

use super::Database;
use crate::models::TenantRole;

/// Checks the calling actor against platform admin status and the privileged
/// tenant roles. No side effects; a denial rejects the whole batch before any
/// row is processed.
#[derive(Clone)]
pub struct PermissionGate {
    db: Database,
}

impl PermissionGate {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Allow platform super-administrators, and actors holding a privileged
    /// role (owner, principal, vice_principal, hr_manager, super_admin)
    /// within the target tenant.
    pub async fn authorize(&self, actor_id: Uuid, tenant_id: Uuid) -> Result<(), AppError> {
        if self.db.is_platform_admin(actor_id).await? {
            return Ok(());
        }

        let roles = self.db.find_role_codes(tenant_id, actor_id).await?;
        let privileged = roles
            .iter()
            .filter_map(|code| TenantRole::parse(code))
            .any(|role| role.is_privileged());

        if privileged {
            Ok(())
        } else {
            tracing::warn!(actor_id = %actor_id, tenant_id = %tenant_id, "Provisioning denied");
            Err(AppError::Forbidden(anyhow::anyhow!(
                "You do not have permission to provision accounts for this tenant"
            )))
        }
    }
}
