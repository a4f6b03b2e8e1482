//! Services layer for the provisioning service.
//!
//! Validation, permission checks, identity resolution and the per-row
//! side-effect pipeline live here; handlers stay thin.

mod database;
pub mod error;
mod identity;
mod jwt;
mod permission;
mod provisioning;
mod validation;

pub use database::Database;
pub use error::ProvisionError;
pub use identity::{
    AdminApiProvider, IdentityProvider, IdentityResolver, MockIdentityProvider, ProviderUser,
    ResolvedIdentity, LOOKUP_PAGE_SIZE, MAX_LOOKUP_PAGES,
};
pub use jwt::{AccessTokenClaims, JwtService};
pub use permission::PermissionGate;
pub use provisioning::{BatchOutcome, ProvisioningService};
pub use validation::validate_row;
