//! Role grant model - a single (tenant, identity, role) permission fact.
//!
//! Grants carry no independent lifecycle: each successful provisioning of an
//! identity replaces its grant set wholesale. An identity's roles within a
//! tenant are therefore always exactly what its most recent import supplied.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::TenantRole;

#[derive(Debug, Clone, FromRow)]
pub struct RoleGrant {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role_code: String,
    pub created_utc: DateTime<Utc>,
}

impl RoleGrant {
    pub fn new(tenant_id: Uuid, user_id: Uuid, role: TenantRole) -> Self {
        Self {
            tenant_id,
            user_id,
            role_code: role.as_str().to_string(),
            created_utc: Utc::now(),
        }
    }
}
