//! Domain models for the provisioning service.

mod audit_event;
mod directory_entry;
mod import;
mod membership;
mod role;
mod role_grant;
mod tenant;

pub use audit_event::{AuditAction, AuditEvent};
pub use directory_entry::DirectoryEntry;
pub use import::{
    ImportMode, ImportRequest, ImportResponse, ImportRow, ImportRowRequest, RowResult,
    MAX_BATCH_ROWS, ROW_NUMBER_OFFSET,
};
pub use membership::{Membership, MembershipStatus};
pub use role::{normalize_roles, TenantRole, PRIVILEGED_ROLES};
pub use role_grant::RoleGrant;
pub use tenant::{Tenant, TenantResponse};
