//! Authentication service.
//!
//! Owns the OTP issue/verify lifecycle and session issuance. The one-time
//! code is generated and compared as a canonical string, and it is consumed
//! (cleared + session flag set) in the same atomic store update that
//! validates it, so a code can never be redeemed twice.

use chrono::{Duration, Utc};
use rand::Rng;
use thiserror::Error;

use mercato_core::{Email, EmailError, OtpCode, OtpError};

use super::notify::{NotifyError, OtpNotifier};
use super::tokens::{TokenError, TokenSigner};
use crate::models::UserView;
use crate::store::{StoreError, UserStore};

/// Server-side validity window for an issued code.
const OTP_TTL_MINUTES: i64 = 5;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email failed boundary validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Submitted code failed boundary validation.
    #[error("invalid code: {0}")]
    InvalidCode(#[from] OtpError),

    /// Unknown email, wrong code, replayed code, or expired code.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Code was persisted but could not be delivered.
    #[error("delivery failed: {0}")]
    Delivery(#[source] NotifyError),

    /// Session token could not be minted.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Generate a 6-digit one-time code, uniform over [100000, 999999].
#[must_use]
pub fn generate_otp() -> OtpCode {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    OtpCode::parse(&code.to_string()).unwrap_or_else(|_| unreachable!("6-digit range"))
}

/// Authentication service over the injected store and notifier.
pub struct AuthService<'a> {
    store: &'a dyn UserStore,
    notifier: &'a dyn OtpNotifier,
    tokens: &'a TokenSigner,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        store: &'a dyn UserStore,
        notifier: &'a dyn OtpNotifier,
        tokens: &'a TokenSigner,
    ) -> Self {
        Self {
            store,
            notifier,
            tokens,
        }
    }

    /// Issue a one-time code for `email` and dispatch it.
    ///
    /// The record is created with an empty cart on first sight of the email;
    /// an existing record gets its code overwritten and its session flag
    /// reset. The code stays persisted even when delivery fails, so an
    /// operator can retrieve it out-of-band.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` on malformed input,
    /// `AuthError::Delivery` when the notifier fails after persistence, and
    /// `AuthError::Store` on store failure.
    pub async fn request_otp(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        let code = generate_otp();
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        self.store.upsert_otp(&email, &code, expires_at).await?;

        if let Err(e) = self.notifier.send_otp(&email, &code).await {
            tracing::warn!(email = %email, error = %e, "OTP delivery failed");
            return Err(AuthError::Delivery(e));
        }

        tracing::info!(email = %email, "OTP issued");
        Ok(())
    }

    /// Verify a submitted code and mint a session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the code does not match
    /// (unknown email, wrong, replayed, or expired code).
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<(String, UserView), AuthError> {
        let email = Email::parse(email)?;
        let code = OtpCode::parse(otp)?;

        let consumed = self.store.consume_otp(&email, &code, Utc::now()).await?;
        if !consumed {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.mint(&email, Utc::now())?;
        let record = self
            .store
            .find_by_email(&email)
            .await?
            // The record was just updated, so absence means it was deleted
            // out from under us; treat it like a failed verification.
            .ok_or(AuthError::InvalidCredentials)?;

        tracing::info!(email = %email, "session issued");
        Ok((token, UserView::from(record)))
    }

    /// Clear the display-only session flag.
    ///
    /// The bearer token stays valid until it expires (no revocation).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` on store failure.
    pub async fn logout(&self, email: &Email) -> Result<(), AuthError> {
        self.store.set_logged_in(email, false).await?;
        Ok(())
    }
}
