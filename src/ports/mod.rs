//! Port traits. API boundaries for the hexagon.
//!
//! Outbound only: use cases call into persistence, the identity provider
//! and the rate limiter. The HTTP adapter drives the use cases directly.

pub mod identity;
pub mod outbound;
pub mod rate_limit;

pub use identity::IdentityPort;
pub use outbound::{ContactRepo, QuizRepo, SubscriberRepo};
pub use rate_limit::{RateLimitDecision, RateLimitPort, RetryDirective};
