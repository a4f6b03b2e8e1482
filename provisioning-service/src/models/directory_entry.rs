//! Directory entry model - read-optimized denormalization of contact data.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One entry per (tenant, identity), kept in sync by every successful commit.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DirectoryEntry {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub updated_utc: DateTime<Utc>,
}

impl DirectoryEntry {
    pub fn new(
        tenant_id: Uuid,
        user_id: Uuid,
        email: String,
        display_name: Option<String>,
        phone: Option<String>,
    ) -> Self {
        Self {
            tenant_id,
            user_id,
            email,
            display_name,
            phone,
            updated_utc: Utc::now(),
        }
    }
}
