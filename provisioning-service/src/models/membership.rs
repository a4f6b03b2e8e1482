//! Membership model - attaches an identity to a tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Membership state codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Inactive,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Inactive => "inactive",
        }
    }
}

/// Membership entity. Unique on (tenant, identity); upserted, never duplicated.
#[derive(Debug, Clone, FromRow)]
pub struct Membership {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub status_code: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Membership {
    /// Create a new active membership.
    pub fn new(tenant_id: Uuid, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            tenant_id,
            user_id,
            status_code: MembershipStatus::Active.as_str().to_string(),
            created_utc: now,
            updated_utc: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status_code == MembershipStatus::Active.as_str()
    }
}
