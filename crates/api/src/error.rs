//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, ApiError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::store::StoreError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Missing or malformed client input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No bearer credential on a protected request.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bearer credential failed signature or expiry checks.
    #[error("Invalid token")]
    InvalidToken,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) | AuthError::InvalidCode(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
                AuthError::Delivery(_) | AuthError::Token(_) | AuthError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Cart(err) => match err {
                CartError::InvalidProduct(_) | CartError::InvalidQuantity => {
                    StatusCode::BAD_REQUEST
                }
                CartError::Duplicate => StatusCode::CONFLICT,
                CartError::UserNotFound | CartError::EntryNotFound => StatusCode::NOT_FOUND,
                CartError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) | Self::InvalidToken => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(e) => e.to_string(),
                AuthError::InvalidCode(_) | AuthError::InvalidCredentials => {
                    "Invalid OTP".to_string()
                }
                AuthError::Delivery(_) => "Failed to send OTP".to_string(),
                AuthError::Token(_) | AuthError::Store(_) => "Internal server error".to_string(),
            },
            Self::Cart(err) => match err {
                CartError::InvalidProduct(e) => e.to_string(),
                CartError::InvalidQuantity => "Quantity must be at least 1".to_string(),
                CartError::Duplicate => "Product already in cart".to_string(),
                CartError::UserNotFound => "User not found".to_string(),
                CartError::EntryNotFound => "Product not found in cart".to_string(),
                CartError::Store(_) => "Internal server error".to_string(),
            },
            Self::Validation(msg) => msg.clone(),
            Self::Unauthorized(msg) => msg.clone(),
            Self::InvalidToken => "Invalid token".to_string(),
            Self::NotFound(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl ApiError {
    /// Whether this error is surfaced as a 5xx and captured to Sentry.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Store(_) | Self::Internal(_) => true,
            Self::Auth(err) => matches!(
                err,
                AuthError::Delivery(_) | AuthError::Token(_) | AuthError::Store(_)
            ),
            Self::Cart(err) => matches!(err, CartError::Store(_)),
            _ => false,
        }
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
