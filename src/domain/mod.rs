//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod reading_time;

pub use entities::{
    Category, ContactMessage, Difficulty, NewQuestion, Profile, PublicQuestion, Question,
    Subscriber, SubscriptionStatus, normalize_email,
};
pub use errors::DomainError;
pub use reading_time::{ReadingTime, calculate_reading_time, reading_time_string};
