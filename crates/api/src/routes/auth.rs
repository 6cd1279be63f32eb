//! Authentication route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::middleware::RequireSession;
use crate::services::AuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
}

/// Verification request body.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

/// Request a one-time code by email.
///
/// The code is persisted and dispatched; the response never contains it.
#[instrument(skip(state, req))]
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Result<Json<Value>> {
    let email = req
        .email
        .ok_or_else(|| ApiError::Validation("Email is required".to_owned()))?;

    let auth = AuthService::new(state.store(), state.notifier(), state.tokens());
    auth.request_otp(&email).await?;

    Ok(Json(json!({ "message": "OTP sent successfully" })))
}

/// Exchange a one-time code for a session token.
#[instrument(skip(state, req))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Value>> {
    let (Some(email), Some(otp)) = (req.email, req.otp) else {
        return Err(ApiError::Validation("Email and OTP are required".to_owned()));
    };

    let auth = AuthService::new(state.store(), state.notifier(), state.tokens());
    let (token, user) = auth.verify_otp(&email, &otp).await?;

    Ok(Json(json!({
        "token": token,
        "message": "Logged in successfully",
        "user": user,
    })))
}

/// Clear the display-only session flag.
#[instrument(skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
) -> Result<Json<Value>> {
    let auth = AuthService::new(state.store(), state.notifier(), state.tokens());
    auth.logout(&user.email).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}
