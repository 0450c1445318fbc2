//! Error types for polls-server services

use crate::auth::{PasswordError, TokenError};
use crate::models::ValidationError;
use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Everything a service operation can fail with. Business-rule rejections
/// get their own variants so the HTTP layer can map them without string
/// matching.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{resource} not found with {field} : '{value}'")]
    NotFound {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Sorry! This Poll has already expired")]
    PollClosed,

    #[error("Sorry! You have already cast your vote in this poll")]
    AlreadyVoted,

    #[error("Username is already taken!")]
    UsernameTaken,

    #[error("Email Address already in use!")]
    EmailInUse,

    #[error("Bad credentials")]
    BadCredentials,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(resource: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            resource,
            field,
            value: value.to_string(),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(e: PasswordError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(e: TokenError) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = ServiceError::not_found("Poll", "id", 7);
        assert_eq!(err.to_string(), "Poll not found with id : '7'");
    }

    #[test]
    fn validation_is_transparent() {
        let err = ServiceError::from(ValidationError::Empty { field: "question" });
        assert_eq!(err.to_string(), "question cannot be empty");
    }
}
