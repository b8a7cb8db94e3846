//! Newsletter sign-up and opt-out.

use crate::domain::{DomainError, SubscriptionStatus, normalize_email};
use crate::ports::SubscriberRepo;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeOutcome {
    Created,
    Reactivated,
    AlreadySubscribed,
}

pub struct NewsletterService {
    repo: Arc<dyn SubscriberRepo>,
}

impl NewsletterService {
    pub fn new(repo: Arc<dyn SubscriberRepo>) -> Self {
        Self { repo }
    }

    pub async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, DomainError> {
        let email = normalize_email(email)?;
        // Insert first: the unique email decides races, not a prior read.
        let outcome = if self.repo.insert_subscriber(&email).await?.is_some() {
            SubscribeOutcome::Created
        } else if self
            .repo
            .set_subscriber_status(&email, SubscriptionStatus::Active)
            .await?
        {
            SubscribeOutcome::Reactivated
        } else {
            SubscribeOutcome::AlreadySubscribed
        };
        info!(?outcome, "newsletter subscribe");
        Ok(outcome)
    }

    /// Returns false if there was no active subscription for `email`.
    pub async fn unsubscribe(&self, email: &str) -> Result<bool, DomainError> {
        let email = normalize_email(email)?;
        let closed = self
            .repo
            .set_subscriber_status(&email, SubscriptionStatus::Unsubscribed)
            .await?;
        info!(closed, "newsletter unsubscribe");
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::SqliteRepo;

    #[tokio::test]
    async fn test_subscribe_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(SqliteRepo::connect(dir.path()).await.unwrap());
        let svc = NewsletterService::new(repo.clone());

        assert_eq!(
            svc.subscribe("Ada@Example.com").await.unwrap(),
            SubscribeOutcome::Created
        );
        assert_eq!(
            svc.subscribe(" ada@example.com ").await.unwrap(),
            SubscribeOutcome::AlreadySubscribed
        );
        assert!(svc.unsubscribe("ADA@example.com").await.unwrap());
        assert!(!svc.unsubscribe("ada@example.com").await.unwrap());
        assert_eq!(
            svc.subscribe("ada@example.com").await.unwrap(),
            SubscribeOutcome::Reactivated
        );

        let stored = repo.subscriber_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Active);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_subscribe_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(SqliteRepo::connect(dir.path()).await.unwrap());
        let svc = Arc::new(NewsletterService::new(repo.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.subscribe("race@example.com").await })
            })
            .collect();
        let mut outcomes = Vec::new();
        for h in handles {
            outcomes.push(h.await.unwrap().unwrap());
        }

        let created = outcomes
            .iter()
            .filter(|o| **o == SubscribeOutcome::Created)
            .count();
        assert_eq!(created, 1);
        assert!(
            outcomes
                .iter()
                .all(|o| matches!(o, SubscribeOutcome::Created | SubscribeOutcome::AlreadySubscribed))
        );
        assert!(repo.subscriber_by_email("race@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected_before_storage() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(SqliteRepo::connect(dir.path()).await.unwrap());
        let svc = NewsletterService::new(repo);
        assert!(matches!(
            svc.subscribe("not-an-email").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.unsubscribe("").await,
            Err(DomainError::Validation(_))
        ));
    }
}
