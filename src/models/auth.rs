//! Authentication-related models
//!
//! Request types deliberately do not derive `Debug` so passwords never end up in logs.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 1024, message = "must be between 1 and 1024 characters"))]
    pub password: String,
}

/// Login request
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 1024, message = "must be between 1 and 1024 characters"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    /// seconds until the token expires, `null` for non-expiring tokens
    pub expires_in: Option<u64>,
}

/// Plain confirmation message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
