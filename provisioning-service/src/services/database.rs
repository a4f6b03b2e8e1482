//! PostgreSQL database service for the provisioning pipeline.

use service_core::error::AppError;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{AuditEvent, DirectoryEntry, Membership, RoleGrant, Tenant, TenantRole};

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!("Database health check failed: {}", e))
            })?;
        Ok(())
    }

    // ==================== Tenant Operations ====================

    /// Find tenant by slug.
    pub async fn find_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, AppError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE tenant_slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Insert a new tenant.
    pub async fn insert_tenant(&self, tenant: &Tenant) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO tenants (tenant_id, tenant_slug, tenant_label, created_utc)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(tenant.tenant_id)
        .bind(&tenant.tenant_slug)
        .bind(&tenant.tenant_label)
        .bind(tenant.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    // ==================== Permission Operations ====================

    /// Check whether a user is a platform-wide super administrator.
    pub async fn is_platform_admin(&self, user_id: Uuid) -> Result<bool, AppError> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT user_id FROM platform_admins WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(row.is_some())
    }

    /// Role codes held by a user within a tenant.
    pub async fn find_role_codes(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT role_code FROM role_grants WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(rows.into_iter().map(|(code,)| code).collect())
    }

    // ==================== Membership Operations ====================

    /// Upsert a membership as active. Unique on (tenant, user).
    pub async fn upsert_membership(&self, membership: &Membership) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO memberships (tenant_id, user_id, status_code, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (tenant_id, user_id)
            DO UPDATE SET status_code = EXCLUDED.status_code, updated_utc = EXCLUDED.updated_utc
            "#,
        )
        .bind(membership.tenant_id)
        .bind(membership.user_id)
        .bind(&membership.status_code)
        .bind(membership.created_utc)
        .bind(membership.updated_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    // ==================== Role Grant Operations ====================

    /// Replace a user's role grants within a tenant wholesale.
    ///
    /// Delete-then-insert inside one transaction: the grant set after commit
    /// is exactly the supplied set, never a union with past imports.
    pub async fn replace_role_grants(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        roles: &[TenantRole],
    ) -> Result<(), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        sqlx::query("DELETE FROM role_grants WHERE tenant_id = $1 AND user_id = $2")
            .bind(tenant_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        for role in roles {
            let grant = RoleGrant::new(tenant_id, user_id, *role);
            sqlx::query(
                r#"
                INSERT INTO role_grants (tenant_id, user_id, role_code, created_utc)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(grant.tenant_id)
            .bind(grant.user_id)
            .bind(&grant.role_code)
            .bind(grant.created_utc)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    // ==================== Directory Operations ====================

    /// Upsert a directory entry for (tenant, user).
    pub async fn upsert_directory_entry(&self, entry: &DirectoryEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO directory_entries (tenant_id, user_id, email, display_name, phone, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tenant_id, user_id)
            DO UPDATE SET email = EXCLUDED.email,
                          display_name = EXCLUDED.display_name,
                          phone = EXCLUDED.phone,
                          updated_utc = EXCLUDED.updated_utc
            "#,
        )
        .bind(entry.tenant_id)
        .bind(entry.user_id)
        .bind(&entry.email)
        .bind(&entry.display_name)
        .bind(&entry.phone)
        .bind(entry.updated_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    // ==================== Audit Operations ====================

    /// Append an audit event. Audit rows are never updated or deleted.
    pub async fn insert_audit_event(&self, event: &AuditEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_events
                (event_id, tenant_id, actor_user_id, action_code, entity_type, entity_id, metadata, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.event_id)
        .bind(event.tenant_id)
        .bind(event.actor_user_id)
        .bind(&event.action_code)
        .bind(&event.entity_type)
        .bind(event.entity_id)
        .bind(&event.metadata)
        .bind(event.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }
}
