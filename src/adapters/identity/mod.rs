//! Identity adapters. Implement IdentityPort.
//!
//! OIDC userinfo over HTTP for real deployments, static token map otherwise.

pub mod static_identity;
pub mod userinfo;

pub use static_identity::StaticIdentity;
pub use userinfo::UserInfoIdentity;
