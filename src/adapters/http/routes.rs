use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    Json,
    extract::{
        ConnectInfo, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use serde::{Deserialize, Serialize};

use super::{error::AppError, state::AppState};
use crate::{
    domain::{Category, ContactMessage, DomainError, Profile, PublicQuestion, ReadingTime},
    ports::RateLimitDecision,
    usecases::{AnswerSubmission, ContactForm, QuestionQuery, QuizScore, SubscribeOutcome},
};

const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Deserialize)]
pub struct EmailPayload {
    email: String,
}

#[derive(Deserialize)]
pub struct GradePayload {
    answers: Vec<AnswerSubmission>,
}

#[derive(Deserialize)]
pub struct ReadingTimePayload {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
pub struct SubscribeResponse {
    outcome: SubscribeOutcome,
}

#[derive(Serialize)]
pub struct ReadingTimeResponse {
    words: usize,
    minutes: u32,
    label: String,
}

/// Socket peer address, or the first `X-Forwarded-For` hop when `trust_forwarded_for`
/// is set and the header parses.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> IpAddr {
    if !trust_forwarded_for {
        return peer.ip();
    }
    headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok())
        .unwrap_or_else(|| peer.ip())
}

async fn enforce_rate_limit(
    state: &AppState,
    headers: &HeaderMap,
    peer: SocketAddr,
) -> Result<(), AppError> {
    match state
        .rate_limiter
        .check(client_ip(headers, peer, state.trust_forwarded_for))
        .await
    {
        RateLimitDecision::Allow => Ok(()),
        RateLimitDecision::Reject(directive) => Err(DomainError::RateLimited {
            seconds: directive.retry_after_secs(),
        }
        .into()),
    }
}

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn categories_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.quiz.categories().await?))
}

pub async fn questions_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<QuestionQuery>, QueryRejection>,
) -> Result<Json<Vec<PublicQuestion>>, AppError> {
    let Query(query) = query?;
    Ok(Json(state.quiz.questions(&query).await?))
}

pub async fn question_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PublicQuestion>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.quiz.question(id).await?))
}

pub async fn grade_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GradePayload>, JsonRejection>,
) -> Result<Json<QuizScore>, AppError> {
    let Json(payload) = payload?;
    Ok(Json(state.quiz.grade(&payload.answers).await?))
}

pub async fn subscribe_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<EmailPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscribeResponse>), AppError> {
    enforce_rate_limit(&state, &headers, peer).await?;
    let Json(payload) = payload?;

    let outcome = state.newsletter.subscribe(&payload.email).await?;
    let status = match outcome {
        SubscribeOutcome::AlreadySubscribed => StatusCode::OK,
        SubscribeOutcome::Created | SubscribeOutcome::Reactivated => StatusCode::CREATED,
    };
    Ok((status, Json(SubscribeResponse { outcome })))
}

pub async fn unsubscribe_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EmailPayload>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(payload) = payload?;
    if state.newsletter.unsubscribe(&payload.email).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DomainError::NotFound("active subscription".into()).into())
    }
}

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactMessage>), AppError> {
    enforce_rate_limit(&state, &headers, peer).await?;
    let Json(form) = payload?;
    Ok((StatusCode::CREATED, Json(state.contact.submit(&form).await?)))
}

pub async fn reading_time_handler(
    payload: Result<Json<ReadingTimePayload>, JsonRejection>,
) -> Result<Json<ReadingTimeResponse>, AppError> {
    let Json(payload) = payload?;
    let estimate = ReadingTime::of(payload.text.as_deref());
    Ok(Json(ReadingTimeResponse {
        words: estimate.words,
        minutes: estimate.minutes,
        label: estimate.to_string(),
    }))
}

pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Profile>, AppError> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    Ok(Json(state.account.profile(authorization).await?))
}
