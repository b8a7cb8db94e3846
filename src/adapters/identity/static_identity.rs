//! Static identity adapter for local development and tests.
//!
//! Resolves a fixed set of tokens without contacting any provider.

use crate::domain::{DomainError, Profile};
use crate::ports::IdentityPort;
use std::collections::HashMap;
use tracing::info;

/// Token -> profile map. Unknown tokens are unauthorized.
#[derive(Default)]
pub struct StaticIdentity {
    tokens: HashMap<String, Profile>,
}

impl StaticIdentity {
    /// No tokens: every request is unauthorized.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, profile: Profile) -> Self {
        self.tokens.insert(token.into(), profile);
        self
    }

    /// Single token that resolves to a local developer profile.
    pub fn dev(token: impl Into<String>) -> Self {
        Self::new().with_token(
            token,
            Profile {
                subject: "dev".to_string(),
                email: Some("dev@localhost".to_string()),
                name: Some("Local Developer".to_string()),
            },
        )
    }
}

#[async_trait::async_trait]
impl IdentityPort for StaticIdentity {
    async fn profile(&self, bearer_token: &str) -> Result<Profile, DomainError> {
        match self.tokens.get(bearer_token) {
            Some(profile) => {
                info!(subject = %profile.subject, "[STATIC] resolved token");
                Ok(profile.clone())
            }
            None => Err(DomainError::Unauthorized("unknown token".into())),
        }
    }
}
