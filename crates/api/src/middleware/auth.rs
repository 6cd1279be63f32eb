//! Session authentication extractor.
//!
//! Provides an extractor for requiring a valid session token in route
//! handlers. Verification is pure: signature and expiry are checked against
//! the signing secret, and the store is never touched.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use mercato_core::Email;

use crate::error::ApiError;
use crate::state::AppState;

/// The identity decoded from a session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Email claim asserted by the token.
    pub email: Email,
}

/// Extractor that requires a valid session token.
///
/// Reads the `Authorization` header, tolerating an optional `Bearer `
/// prefix. Rejects with 401 when the header is absent and 400 when the
/// token fails verification.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireSession(user): RequireSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireSession(pub CurrentUser);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Access denied, no token provided".to_owned())
            })?;

        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return Err(ApiError::Unauthorized(
                "Access denied, no token provided".to_owned(),
            ));
        }

        let email = state
            .tokens()
            .verify(token)
            .map_err(|_| ApiError::InvalidToken)?;

        Ok(Self(CurrentUser { email }))
    }
}
