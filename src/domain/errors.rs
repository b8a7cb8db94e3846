//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    /// Caller exceeded its request budget; may retry after `seconds`.
    #[error("Too many requests: retry after {seconds} seconds")]
    RateLimited { seconds: u64 },

    #[error("Seed error: {0}")]
    Seed(String),
}
