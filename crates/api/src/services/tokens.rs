//! Session token minting and verification.
//!
//! Tokens are HS256 JWTs carrying the email identity. Verification is
//! stateless: it never touches the store, so it can gate every protected
//! request without blocking on I/O.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mercato_core::Email;

/// Session lifetime. Tokens are not revocable, so this bounds how long a
/// leaked token stays usable.
const SESSION_TTL_DAYS: i64 = 7;

/// Errors that can occur when minting or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token could not be signed.
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),

    /// Signature, expiry, or claim validation failed.
    #[error("invalid token")]
    Invalid,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Email identity.
    sub: String,
    /// Issued-at, seconds since epoch.
    iat: i64,
    /// Expiry, seconds since epoch.
    exp: i64,
}

/// Mints and verifies session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    /// Create a signer from the configured secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Mint a session token asserting `email`, valid for seven days.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Sign` if encoding fails.
    pub fn mint(&self, email: &Email, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: email.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify a token and extract the email identity.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` on any signature, expiry, or claim
    /// failure. The reason is deliberately not distinguished to the caller.
    pub fn verify(&self, token: &str) -> Result<Email, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;
        Email::parse(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(&SecretString::from("0RNpVCEqeTqzXwZMhbMYtxVhRC1Zfl0e"))
    }

    fn email() -> Email {
        Email::parse("a@x.com").unwrap()
    }

    #[test]
    fn test_mint_verify_roundtrip() {
        let signer = signer();
        let token = signer.mint(&email(), Utc::now()).unwrap();
        let verified = signer.verify(&token).unwrap();
        assert_eq!(verified, email());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let signer = signer();
        let mut token = signer.mint(&email(), Utc::now()).unwrap();
        token.push('x');
        assert!(matches!(signer.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = signer().mint(&email(), Utc::now()).unwrap();
        let other = TokenSigner::new(&SecretString::from("WrMhbZfl0e0RNpVCEqeTqzXwZMYtxVhR"));
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = signer();
        // Minted more than the TTL ago
        let past = Utc::now() - Duration::days(SESSION_TTL_DAYS + 1);
        let token = signer.mint(&email(), past).unwrap();
        assert!(matches!(signer.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            signer().verify("not-a-jwt"),
            Err(TokenError::Invalid)
        ));
    }
}
