//! Sign-up and sign-in endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::service::{AccountService, SignUp};

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /api/auth/signup
async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = AccountService::new(state.store.as_ref(), &state.tokens)
        .signup(SignUp {
            name: &req.name,
            username: &req.username,
            email: &req.email,
            password: &req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/users/{}", user.username))],
        Json(ApiResponse::ok("User registered successfully")),
    ))
}

/// POST /api/auth/signin
async fn signin(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignInRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let access_token = AccountService::new(state.store.as_ref(), &state.tokens)
        .signin(&req.username_or_email, &req.password)
        .await?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".into(),
    }))
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/signin", post(signin))
}
