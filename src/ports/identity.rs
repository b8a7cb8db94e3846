//! Identity provider outbound port. Resolve a session token to a user profile.

use crate::domain::{DomainError, Profile};

/// Port for asking the external identity provider who a bearer token belongs to.
///
/// Implemented by adapters (OIDC userinfo over HTTP, static token map for dev).
#[async_trait::async_trait]
pub trait IdentityPort: Send + Sync {
    /// Resolve `bearer_token` to the profile it was issued for.
    ///
    /// # Errors
    /// `DomainError::Unauthorized` if the provider rejects the token,
    /// `DomainError::Identity` if the provider could not be reached or answered garbage.
    async fn profile(&self, bearer_token: &str) -> Result<Profile, DomainError>;
}
