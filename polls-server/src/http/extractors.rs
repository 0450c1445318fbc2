//! Custom Axum extractors
//!
//! `CurrentUser` requires a valid bearer token; `MaybeUser` treats a missing
//! or invalid token as an anonymous request. `ApiJson`, `ApiQuery` and
//! `ApiPath` wrap axum's extractors so malformed input answers with `ApiError`.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiError;
use super::server::AppState;
use crate::auth::TokenRejection;
use crate::store::{User, UserId};

const BEARER: &str = "Bearer ";

/// JSON body, rejected as a 400 `ApiError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string, rejected as a 400 `ApiError`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters, rejected as a 400 `ApiError`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }
}

/// Caller if authenticated, `None` otherwise
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|u| u.id)
    }
}

/// Outcome of reading the Authorization header
enum Credentials {
    Missing,
    Rejected(TokenRejection),
    UnknownUser,
    Valid(User),
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn credentials(parts: &Parts, state: &AppState) -> Result<Credentials, ApiError> {
    let Some(token) = bearer_token(parts) else {
        return Ok(Credentials::Missing);
    };

    let user_id = match state.tokens.verify(token) {
        Ok(id) => id,
        Err(rejection) => return Ok(Credentials::Rejected(rejection)),
    };

    match state.store.find_user(user_id).await? {
        Some(user) => Ok(Credentials::Valid(user)),
        None => Ok(Credentials::UnknownUser),
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match credentials(parts, state).await? {
            Credentials::Valid(user) => Ok(Self(user)),
            Credentials::Missing => Err(ApiError::unauthorized(
                "Full authentication is required to access this resource",
            )),
            Credentials::Rejected(rejection) => {
                tracing::debug!(%rejection, "bearer token rejected");
                Err(ApiError::unauthorized(rejection.to_string()))
            }
            Credentials::UnknownUser => Err(ApiError::unauthorized("token subject no longer exists")),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match credentials(parts, state).await? {
            Credentials::Valid(user) => Ok(Self(Some(user))),
            Credentials::Rejected(rejection) => {
                tracing::debug!(%rejection, "ignoring invalid token on optional auth");
                Ok(Self(None))
            }
            Credentials::Missing | Credentials::UnknownUser => Ok(Self(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn reads_bearer_token() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def.ghi"))), Some("abc.def.ghi"));
    }

    #[test]
    fn ignores_other_schemes() {
        assert_eq!(bearer_token(&parts(Some("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }
}
