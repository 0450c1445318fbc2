//! Route handlers organized by resource

pub mod health;
pub mod auth;
pub mod polls;
pub mod users;

use serde::{Deserialize, Serialize};

/// Acknowledgement body for create-style endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
