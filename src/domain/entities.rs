//! Domain entities. Pure data structures for the core business.
//!
//! No database/HTTP types here; adapters map rows and payloads into these.

use super::errors::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 6;
const MAX_EMAIL_LEN: usize = 254;

/// Quiz category (e.g. "Rust", "Networking").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(DomainError::Validation(format!(
                "unknown difficulty: {other}"
            ))),
        }
    }
}

/// A stored multiple-choice question, including its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub category_id: i64,
    pub prompt: String,
    pub options: Vec<String>,
    pub answer_index: usize,
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
}

/// Question payload before it has an id (seed files, admin inserts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl NewQuestion {
    /// Prompt non-blank, 2..=6 non-blank options, answer index in range.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.prompt.trim().is_empty() {
            return Err(DomainError::Validation("question prompt is empty".into()));
        }
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&self.options.len()) {
            return Err(DomainError::Validation(format!(
                "question needs {MIN_OPTIONS}..={MAX_OPTIONS} options, got {}",
                self.options.len()
            )));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(DomainError::Validation("question option is empty".into()));
        }
        if self.answer_index >= self.options.len() {
            return Err(DomainError::Validation(format!(
                "answer index {} out of range for {} options",
                self.answer_index,
                self.options.len()
            )));
        }
        Ok(())
    }
}

/// Client-facing question. The answer stays on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub category_id: i64,
    pub prompt: String,
    pub options: Vec<String>,
    pub difficulty: Difficulty,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            category_id: q.category_id,
            prompt: q.prompt,
            options: q.options,
            difficulty: q.difficulty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Unsubscribed,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Unsubscribed => "unsubscribed",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "unsubscribed" => Ok(SubscriptionStatus::Unsubscribed),
            other => Err(DomainError::Repo(format!(
                "unknown subscription status: {other}"
            ))),
        }
    }
}

/// Newsletter subscriber. `email` is always normalized (see [`normalize_email`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Message left through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(alias = "sub")]
    pub subject: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Trim and lowercase an email address, rejecting anything that is clearly not one.
pub fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    let invalid = |why: &str| DomainError::Validation(format!("invalid email address: {why}"));

    if email.is_empty() {
        return Err(invalid("empty"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(invalid("too long"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid("contains whitespace"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid("missing @"));
    };
    if domain.contains('@') {
        return Err(invalid("more than one @"));
    }
    if local.is_empty() {
        return Err(invalid("empty local part"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("bad domain"));
    }
    Ok(email)
}
