//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes:
//! `{ "success": false, "error": <code>, "message": ..., "field"?: ... }`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::ServiceError;
use crate::models::ValidationError;
use crate::store::StoreError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Malformed input or a refused business rule (400)
    BadRequest {
        message: String,
        field: Option<&'static str>,
    },

    /// Resource not found (404)
    NotFound { message: String },

    /// Missing or rejected credentials (401)
    Unauthorized { message: String },

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest { message, field } => {
                let mut body = json!({
                    "success": false,
                    "error": "validation_error",
                    "message": message
                });
                if let Some(field) = field {
                    body["field"] = json!(field);
                }
                body
            }
            Self::NotFound { message } => json!({
                "success": false,
                "error": "not_found",
                "message": message
            }),
            Self::Unauthorized { message } => json!({
                "success": false,
                "error": "unauthorized",
                "message": message
            }),
            Self::Internal { message } => {
                // Log the actual error, return generic message
                tracing::error!("Internal error: {}", message);
                json!({
                    "success": false,
                    "error": "internal_error",
                    "message": "an internal error occurred"
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest {
            field: Some(e.field()),
            message: e.to_string(),
        }
    }
}

impl ApiError {
    fn malformed(message: String) -> Self {
        Self::BadRequest {
            message,
            field: None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::malformed(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::malformed(e.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        Self::malformed(e.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Internal {
            message: e.to_string(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Invalid(v) => v.into(),
            ServiceError::NotFound { .. } => Self::NotFound {
                message: e.to_string(),
            },
            ServiceError::UsernameTaken => Self::BadRequest {
                message: e.to_string(),
                field: Some("username"),
            },
            ServiceError::EmailInUse => Self::BadRequest {
                message: e.to_string(),
                field: Some("email"),
            },
            ServiceError::PollClosed | ServiceError::AlreadyVoted => Self::BadRequest {
                message: e.to_string(),
                field: None,
            },
            ServiceError::BadCredentials => Self::unauthorized(e.to_string()),
            ServiceError::Store(e) => e.into(),
            ServiceError::Internal(message) => Self::Internal { message },
        }
    }
}
