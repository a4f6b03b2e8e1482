//! Identity provider client and email-to-identity resolution.
//!
//! The external provider's admin API has no find-by-email lookup, so
//! resolution is a bounded linear scan over its paginated user listing. Cost
//! is O(total users) in the worst case, which is acceptable at expected
//! tenant population sizes given the batch cap.

use std::sync::Arc;

use serde::Deserialize;
use service_core::async_trait::async_trait;
use uuid::Uuid;

use super::error::ProvisionError;
use crate::config::IdentityProviderConfig;

/// Page size for admin user listing.
pub const LOOKUP_PAGE_SIZE: u32 = 200;

/// Hard bound on pages scanned per lookup; never loop indefinitely against
/// the provider.
pub const MAX_LOOKUP_PAGES: u32 = 25;

/// An account in the external identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    pub email: String,
}

/// Capability interface over the provider's admin API.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// One page of the full user listing. Pages are 1-based; an empty page
    /// marks the end of the listing.
    async fn list_users(&self, page: u32, per_page: u32)
        -> Result<Vec<ProviderUser>, ProvisionError>;

    /// Create an account with a confirmed email and the given password.
    async fn create_user(&self, email: &str, password: &str)
        -> Result<ProviderUser, ProvisionError>;

    /// Overwrite an existing account's password.
    async fn set_password(&self, user_id: Uuid, password: &str) -> Result<(), ProvisionError>;
}

// ==================== HTTP admin API client ====================

/// Identity provider client over the hosted admin REST API.
#[derive(Clone)]
pub struct AdminApiProvider {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct ListUsersPage {
    users: Vec<ProviderUser>,
}

impl AdminApiProvider {
    pub fn new(config: &IdentityProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        }
    }

    fn admin_url(&self, path: &str) -> String {
        format!("{}/auth/v1/admin{}", self.base_url, path)
    }
}

#[async_trait]
impl IdentityProvider for AdminApiProvider {
    async fn list_users(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ProviderUser>, ProvisionError> {
        let response = self
            .http
            .get(self.admin_url("/users"))
            .query(&[("page", page), ("per_page", per_page)])
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| ProvisionError::Provider(format!("List users failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProvisionError::Provider(format!(
                "List users failed with status {}",
                response.status()
            )));
        }

        let body: ListUsersPage = response
            .json()
            .await
            .map_err(|e| ProvisionError::Provider(format!("Invalid list response: {}", e)))?;
        Ok(body.users)
    }

    async fn create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProvisionError> {
        let response = self
            .http
            .post(self.admin_url("/users"))
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .send()
            .await
            .map_err(|e| ProvisionError::Provider(format!("Create user failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProvisionError::Provider(format!(
                "Create user failed with status {}: {}",
                status, detail
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProvisionError::Provider(format!("Invalid create response: {}", e)))
    }

    async fn set_password(&self, user_id: Uuid, password: &str) -> Result<(), ProvisionError> {
        let response = self
            .http
            .put(self.admin_url(&format!("/users/{}", user_id)))
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await
            .map_err(|e| ProvisionError::Provider(format!("Set password failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProvisionError::Provider(format!(
                "Set password failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

// ==================== Resolver ====================

/// Outcome of resolving an email against the provider.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedIdentity {
    pub user_id: Uuid,
    /// True when this resolution created the account (with the row's
    /// password); false when an existing account was matched.
    pub created: bool,
}

/// Maps an email to a provider account id, creating the account if absent.
#[derive(Clone)]
pub struct IdentityResolver {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Scan the paginated listing for an email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<Option<Uuid>, ProvisionError> {
        let needle = email.to_lowercase();
        for page in 1..=MAX_LOOKUP_PAGES {
            let users = self.provider.list_users(page, LOOKUP_PAGE_SIZE).await?;
            if users.is_empty() {
                break;
            }
            let page_len = users.len();
            if let Some(user) = users.into_iter().find(|u| u.email.to_lowercase() == needle) {
                return Ok(Some(user.id));
            }
            if page_len < LOOKUP_PAGE_SIZE as usize {
                break;
            }
        }
        Ok(None)
    }

    /// Resolve an email to an account id, creating the account with the
    /// row's password when none exists.
    ///
    /// A failed create gets exactly one re-list fallback: a concurrent import
    /// may have created the account between our scan and our create.
    pub async fn resolve(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ResolvedIdentity, ProvisionError> {
        if let Some(user_id) = self.find_by_email(email).await? {
            return Ok(ResolvedIdentity {
                user_id,
                created: false,
            });
        }

        match self.provider.create_user(email, password).await {
            Ok(user) => Ok(ResolvedIdentity {
                user_id: user.id,
                created: true,
            }),
            Err(create_err) => {
                tracing::warn!(email = %email, error = %create_err, "Create failed, re-listing");
                match self.find_by_email(email).await? {
                    Some(user_id) => Ok(ResolvedIdentity {
                        user_id,
                        created: false,
                    }),
                    None => Err(create_err),
                }
            }
        }
    }
}

// ==================== Mock provider ====================

/// In-memory identity provider for tests.
#[derive(Default)]
pub struct MockIdentityProvider {
    state: std::sync::Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    users: Vec<ProviderUser>,
    fail_create_for: Vec<String>,
    fail_set_password_for: Vec<Uuid>,
    creates: usize,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_user(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().users.push(ProviderUser {
            id,
            email: email.to_string(),
        });
        id
    }

    /// Make `create_user` fail for this email.
    pub fn fail_create_for(&self, email: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_create_for
            .push(email.to_lowercase());
    }

    /// Make `set_password` fail for this account.
    pub fn fail_set_password_for(&self, user_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .fail_set_password_for
            .push(user_id);
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().creates
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn list_users(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ProviderUser>, ProvisionError> {
        let state = self.state.lock().unwrap();
        let start = ((page - 1) * per_page) as usize;
        Ok(state
            .users
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn create_user(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<ProviderUser, ProvisionError> {
        let mut state = self.state.lock().unwrap();
        state.creates += 1;
        if state.fail_create_for.contains(&email.to_lowercase()) {
            return Err(ProvisionError::Provider(format!(
                "Create user failed with status 500: simulated failure for {}",
                email
            )));
        }
        let user = ProviderUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn set_password(&self, user_id: Uuid, _password: &str) -> Result<(), ProvisionError> {
        let state = self.state.lock().unwrap();
        if state.fail_set_password_for.contains(&user_id) {
            return Err(ProvisionError::Provider(
                "Set password failed with status 500".to_string(),
            ));
        }
        if !state.users.iter().any(|u| u.id == user_id) {
            return Err(ProvisionError::Provider("User not found".to_string()));
        }
        Ok(())
    }
}
