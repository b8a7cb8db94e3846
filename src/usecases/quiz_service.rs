//! Quiz content: category listing, random question sets and answer grading.
//!
//! Questions leave the service as `PublicQuestion`; answers are only revealed by `grade`.

use crate::domain::{Category, DomainError, PublicQuestion, Question};
use crate::ports::QuizRepo;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_QUESTION_LIMIT: u32 = 10;
pub const MAX_QUESTION_LIMIT: u32 = 50;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct QuestionQuery {
    /// Category slug.
    pub category: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: i64,
    pub choice: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub choice: usize,
    pub correct_index: usize,
    pub correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizScore {
    pub total: usize,
    pub correct: usize,
    pub results: Vec<QuestionResult>,
}

pub struct QuizService {
    repo: Arc<dyn QuizRepo>,
}

impl QuizService {
    pub fn new(repo: Arc<dyn QuizRepo>) -> Self {
        Self { repo }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list_categories().await
    }

    /// Random questions, optionally from one category. Limit defaults to 10, clamped to 1..=50.
    pub async fn questions(&self, query: &QuestionQuery) -> Result<Vec<PublicQuestion>, DomainError> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_QUESTION_LIMIT)
            .clamp(1, MAX_QUESTION_LIMIT);

        let category_id = match query.category.as_deref() {
            Some(slug) => Some(
                self.repo
                    .category_by_slug(slug)
                    .await?
                    .ok_or_else(|| DomainError::NotFound(format!("category {slug}")))?
                    .id,
            ),
            None => None,
        };

        let questions = self.repo.list_questions(category_id, limit).await?;
        Ok(questions.into_iter().map(PublicQuestion::from).collect())
    }

    pub async fn question(&self, id: i64) -> Result<PublicQuestion, DomainError> {
        self.repo
            .question_by_id(id)
            .await?
            .map(PublicQuestion::from)
            .ok_or_else(|| DomainError::NotFound(format!("question {id}")))
    }

    /// Score a set of answers. Results come back in submission order.
    pub async fn grade(&self, answers: &[AnswerSubmission]) -> Result<QuizScore, DomainError> {
        if answers.is_empty() {
            return Err(DomainError::Validation("no answers submitted".into()));
        }
        if answers.len() > MAX_QUESTION_LIMIT as usize {
            return Err(DomainError::Validation(format!(
                "at most {MAX_QUESTION_LIMIT} answers per submission"
            )));
        }
        let mut seen = HashSet::with_capacity(answers.len());
        for a in answers {
            if !seen.insert(a.question_id) {
                return Err(DomainError::Validation(format!(
                    "question {} answered twice",
                    a.question_id
                )));
            }
        }

        let ids: Vec<i64> = answers.iter().map(|a| a.question_id).collect();
        let by_id: HashMap<i64, Question> = self
            .repo
            .questions_by_ids(&ids)
            .await?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();

        let mut results = Vec::with_capacity(answers.len());
        for a in answers {
            let q = by_id.get(&a.question_id).ok_or_else(|| {
                DomainError::Validation(format!("unknown question {}", a.question_id))
            })?;
            results.push(QuestionResult {
                question_id: q.id,
                choice: a.choice,
                correct_index: q.answer_index,
                correct: a.choice == q.answer_index,
                explanation: q.explanation.clone(),
            });
        }

        let correct = results.iter().filter(|r| r.correct).count();
        info!(total = results.len(), correct, "graded quiz");
        Ok(QuizScore {
            total: results.len(),
            correct,
            results,
        })
    }
}
