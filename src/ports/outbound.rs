//! Outbound persistence ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    Category, ContactMessage, DomainError, NewQuestion, Question, Subscriber, SubscriptionStatus,
};

/// Quiz content: categories and their questions.
#[async_trait::async_trait]
pub trait QuizRepo: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError>;

    /// Insert a category. Fails if the slug is already taken.
    async fn insert_category(&self, name: &str, slug: &str) -> Result<Category, DomainError>;

    async fn insert_question(
        &self,
        category_id: i64,
        question: &NewQuestion,
    ) -> Result<Question, DomainError>;

    /// Up to `limit` questions in random order, optionally restricted to one category.
    async fn list_questions(
        &self,
        category_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<Question>, DomainError>;

    async fn question_by_id(&self, id: i64) -> Result<Option<Question>, DomainError>;

    /// Questions matching `ids`. Unknown ids are simply absent from the result.
    async fn questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>, DomainError>;

    async fn count_questions(&self) -> Result<u64, DomainError>;
}

/// Newsletter subscribers, keyed by normalized email.
#[async_trait::async_trait]
pub trait SubscriberRepo: Send + Sync {
    async fn subscriber_by_email(&self, email: &str) -> Result<Option<Subscriber>, DomainError>;

    /// Inserts an active subscriber. `None` if the email is already stored.
    async fn insert_subscriber(&self, email: &str) -> Result<Option<Subscriber>, DomainError>;

    /// Returns true if a row changed.
    async fn set_subscriber_status(
        &self,
        email: &str,
        status: SubscriptionStatus,
    ) -> Result<bool, DomainError>;
}

/// Contact form submissions.
#[async_trait::async_trait]
pub trait ContactRepo: Send + Sync {
    async fn insert_contact_message(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<ContactMessage, DomainError>;
}
