use std::sync::Arc;

use crate::ports::RateLimitPort;
use crate::usecases::{AccountService, ContactService, NewsletterService, QuizService};

/// Shared handler state. Built once in `main` and handed to the router.
pub struct AppState {
    pub quiz: QuizService,
    pub newsletter: NewsletterService,
    pub contact: ContactService,
    pub account: AccountService,
    pub rate_limiter: Arc<dyn RateLimitPort>,
    /// Key rate limits on `X-Forwarded-For`. Only safe behind a proxy that overwrites it.
    pub trust_forwarded_for: bool,
}
