//! Infrastructure adapters. Implement outbound ports, plus the inbound HTTP surface.
//!
//! SQLite, identity provider, rate limiting. Map errors to DomainError.

pub mod http;
pub mod identity;
pub mod persistence;
pub mod rate_limit;
