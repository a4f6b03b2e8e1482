//! HTTP handlers for the provisioning service.

pub mod bootstrap;
pub mod import;
pub mod invite;

use service_core::error::AppError;
use uuid::Uuid;

use crate::services::AccessTokenClaims;

/// Parse the caller's identity-provider user id out of their token claims.
pub(crate) fn parse_actor_id(claims: &AccessTokenClaims) -> Result<Uuid, AppError> {
    claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid subject in token")))
}

/// Tenant slugs are lowercase alphanumerics and hyphens, at most 64 chars.
pub(crate) fn ensure_valid_slug(slug: &str) -> Result<(), AppError> {
    let well_formed = !slug.is_empty()
        && slug.len() <= 64
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if well_formed {
        Ok(())
    } else {
        Err(AppError::BadRequest(anyhow::anyhow!("Invalid tenant slug")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_shape() {
        assert!(ensure_valid_slug("north-hill-academy").is_ok());
        assert!(ensure_valid_slug("school2").is_ok());
        assert!(ensure_valid_slug("").is_err());
        assert!(ensure_valid_slug("Has Spaces").is_err());
        assert!(ensure_valid_slug("UPPER").is_err());
        assert!(ensure_valid_slug(&"a".repeat(65)).is_err());
    }
}
