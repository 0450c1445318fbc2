//! User endpoints: the caller, availability checks and public profiles

use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::extractors::{ApiPath, ApiQuery, CurrentUser, MaybeUser};
use crate::http::server::AppState;
use crate::models::{PageRequest, PagedResponse, PaginationParams};
use crate::service::{AccountService, PollService, PollView, UserProfile, UserSummary};

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
}

/// GET /api/user/me
async fn me(user: CurrentUser) -> Json<UserSummary> {
    Json(UserSummary::from(&user.0))
}

/// GET /api/user/checkUsernameAvailability?username=
async fn check_username(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<UsernameQuery>,
) -> Result<Json<Availability>, ApiError> {
    let available = AccountService::new(state.store.as_ref(), &state.tokens)
        .username_available(&query.username)
        .await?;
    Ok(Json(Availability { available }))
}

/// GET /api/user/checkEmailAvailability?email=
async fn check_email(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<EmailQuery>,
) -> Result<Json<Availability>, ApiError> {
    let available = AccountService::new(state.store.as_ref(), &state.tokens)
        .email_available(&query.email)
        .await?;
    Ok(Json(Availability { available }))
}

/// GET /api/users/{username}
async fn profile(
    State(state): State<Arc<AppState>>,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = AccountService::new(state.store.as_ref(), &state.tokens)
        .profile(&username)
        .await?;
    Ok(Json(profile))
}

/// GET /api/users/{username}/polls
async fn polls_created(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    ApiPath(username): ApiPath<String>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<PagedResponse<PollView>>, ApiError> {
    let page = PageRequest::from_params(params, state.limits)?;
    let polls = PollService::new(state.store.as_ref())
        .list_created_by(&username, user.id(), page)
        .await?;
    Ok(Json(polls))
}

/// GET /api/users/{username}/votes
async fn polls_voted(
    State(state): State<Arc<AppState>>,
    user: MaybeUser,
    ApiPath(username): ApiPath<String>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<PagedResponse<PollView>>, ApiError> {
    let page = PageRequest::from_params(params, state.limits)?;
    let polls = PollService::new(state.store.as_ref())
        .list_voted_by(&username, user.id(), page)
        .await?;
    Ok(Json(polls))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/me", get(me))
        .route("/api/user/checkUsernameAvailability", get(check_username))
        .route("/api/user/checkEmailAvailability", get(check_email))
        .route("/api/users/{username}", get(profile))
        .route("/api/users/{username}/polls", get(polls_created))
        .route("/api/users/{username}/votes", get(polls_voted))
}
