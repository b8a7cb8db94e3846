//! Signed-in user lookup. Delegates token checks to the identity provider.

use crate::domain::{DomainError, Profile};
use crate::ports::IdentityPort;
use std::sync::Arc;

pub struct AccountService {
    identity: Arc<dyn IdentityPort>,
}

impl AccountService {
    pub fn new(identity: Arc<dyn IdentityPort>) -> Self {
        Self { identity }
    }

    /// Resolve an `Authorization` header value to a profile.
    pub async fn profile(&self, authorization: Option<&str>) -> Result<Profile, DomainError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or_else(|| DomainError::Unauthorized("missing bearer token".into()))?;
        self.identity.profile(token).await
    }
}

/// Token part of `Bearer <token>`. Scheme is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::identity::StaticIdentity;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[tokio::test]
    async fn test_profile_requires_valid_header() {
        let svc = AccountService::new(Arc::new(StaticIdentity::dev("t0k")));
        assert_eq!(svc.profile(Some("Bearer t0k")).await.unwrap().subject, "dev");
        assert!(matches!(svc.profile(None).await, Err(DomainError::Unauthorized(_))));
        assert!(matches!(
            svc.profile(Some("Bearer wrong")).await,
            Err(DomainError::Unauthorized(_))
        ));
    }
}
