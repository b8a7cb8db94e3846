//! Application use cases. Orchestrate domain logic via ports.

pub mod account_service;
pub mod contact_service;
pub mod newsletter_service;
pub mod quiz_service;

pub use account_service::AccountService;
pub use contact_service::{ContactForm, ContactService};
pub use newsletter_service::{NewsletterService, SubscribeOutcome};
pub use quiz_service::{AnswerSubmission, QuestionQuery, QuizScore, QuizService};
