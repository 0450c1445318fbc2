//! Poll endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::ApiResponse;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiPath, ApiQuery, CurrentUser, MaybeUser};
use crate::http::server::AppState;
use crate::models::{PageRequest, PagedResponse, PaginationParams, PollDraft};
use crate::service::{PollService, PollView};
use crate::store::{ChoiceId, PollId};

#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PollLengthRequest {
    #[serde(default)]
    pub days: i64,
    #[serde(default)]
    pub hours: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub question: String,
    pub choices: Vec<ChoiceRequest>,
    pub poll_length: PollLengthRequest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub choice_id: ChoiceId,
}

/// GET /api/polls - newest first, paginated
async fn list_polls(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<PagedResponse<PollView>>, ApiError> {
    let page = PageRequest::from_params(params, state.limits)?;
    let polls = PollService::new(state.store.as_ref())
        .list(user.id(), page)
        .await?;
    Ok(Json(polls))
}

/// POST /api/polls - create a poll as the caller
async fn create_poll(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiJson(req): ApiJson<CreatePollRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = PollDraft::new(
        &req.question,
        req.choices.iter().map(|c| c.text.as_str()),
        req.poll_length.days,
        req.poll_length.hours,
    )?;

    let poll = PollService::new(state.store.as_ref())
        .create(user.id(), draft)
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/polls/{}", poll.id))],
        Json(ApiResponse::ok("Poll Created Successfully")),
    ))
}

/// GET /api/polls/{id}
async fn get_poll(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    ApiPath(poll_id): ApiPath<PollId>,
) -> Result<Json<PollView>, ApiError> {
    let poll = PollService::new(state.store.as_ref())
        .get(poll_id, user.id())
        .await?;
    Ok(Json(poll))
}

/// POST /api/polls/{id}/votes
async fn cast_vote(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiPath(poll_id): ApiPath<PollId>,
    ApiJson(req): ApiJson<VoteRequest>,
) -> Result<Json<PollView>, ApiError> {
    let poll = PollService::new(state.store.as_ref())
        .vote(poll_id, req.choice_id, user.id())
        .await?;
    Ok(Json(poll))
}

/// Poll routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/polls", get(list_polls).post(create_poll))
        .route("/api/polls/{id}", get(get_poll))
        .route("/api/polls/{id}/votes", post(cast_vote))
}
