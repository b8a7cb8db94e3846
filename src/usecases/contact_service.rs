//! Contact form submissions.

use crate::domain::{ContactMessage, DomainError, normalize_email};
use crate::ports::ContactRepo;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub struct ContactService {
    repo: Arc<dyn ContactRepo>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepo>) -> Self {
        Self { repo }
    }

    pub async fn submit(&self, form: &ContactForm) -> Result<ContactMessage, DomainError> {
        let name = form.name.trim();
        let message = form.message.trim();
        check_length("name", name, MAX_NAME_CHARS)?;
        check_length("message", message, MAX_MESSAGE_CHARS)?;
        let email = normalize_email(&form.email)?;

        let stored = self.repo.insert_contact_message(name, &email, message).await?;
        info!(id = stored.id, "contact message received");
        Ok(stored)
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(DomainError::Validation(format!("{field} is required")));
    }
    if len > max {
        return Err(DomainError::Validation(format!(
            "{field} is too long ({len} > {max} characters)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::SqliteRepo;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn test_submit_trims_and_stores() {
        let dir = tempfile::tempdir().unwrap();
        let svc = ContactService::new(Arc::new(SqliteRepo::connect(dir.path()).await.unwrap()));
        let stored = svc
            .submit(&form("  Ada ", "ADA@example.com", " Hello there \n"))
            .await
            .unwrap();
        assert_eq!(stored.name, "Ada");
        assert_eq!(stored.email, "ada@example.com");
        assert_eq!(stored.message, "Hello there");
    }

    #[tokio::test]
    async fn test_submit_validates_fields() {
        let dir = tempfile::tempdir().unwrap();
        let svc = ContactService::new(Arc::new(SqliteRepo::connect(dir.path()).await.unwrap()));
        for bad in [
            form("", "ada@example.com", "hi"),
            form("Ada", "ada@example.com", "   "),
            form("Ada", "nope", "hi"),
            form(&"x".repeat(MAX_NAME_CHARS + 1), "ada@example.com", "hi"),
            form("Ada", "ada@example.com", &"y".repeat(MAX_MESSAGE_CHARS + 1)),
        ] {
            assert!(
                matches!(svc.submit(&bad).await, Err(DomainError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submits_all_stored() {
        let dir = tempfile::tempdir().unwrap();
        let svc = Arc::new(ContactService::new(Arc::new(
            SqliteRepo::connect(dir.path()).await.unwrap(),
        )));

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move {
                    svc.submit(&form("Ada", "ada@example.com", &format!("message {i}")))
                        .await
                })
            })
            .collect();
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 64);
    }
}
