//! OIDC userinfo adapter. Implements IdentityPort by forwarding the caller's bearer
//! token to the identity provider's `userinfo` endpoint.

use crate::domain::{DomainError, Profile};
use crate::ports::IdentityPort;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity provider reached over HTTP.
///
/// Any provider exposing an OpenID Connect userinfo endpoint works; the response must
/// carry `sub` and may carry `email` and `name`.
pub struct UserInfoIdentity {
    client: Client,
    userinfo_url: String,
}

impl UserInfoIdentity {
    /// # Arguments
    /// * `userinfo_url` - e.g. "https://auth.example.com/oauth/userinfo"
    pub fn new(userinfo_url: String) -> Self {
        Self {
            client: Client::new(),
            userinfo_url,
        }
    }
}

#[async_trait::async_trait]
impl IdentityPort for UserInfoIdentity {
    async fn profile(&self, bearer_token: &str) -> Result<Profile, DomainError> {
        let res = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(bearer_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| DomainError::Identity(format!("Request failed: {}", e)))?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!(%status, "identity provider rejected token");
            return Err(DomainError::Unauthorized("session is not valid".into()));
        }
        if !status.is_success() {
            let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
            warn!(%status, "identity provider error");
            return Err(DomainError::Identity(format!(
                "userinfo error {}: {}",
                status, text
            )));
        }

        res.json::<Profile>()
            .await
            .map_err(|e| DomainError::Identity(format!("Malformed userinfo response: {}", e)))
    }
}
