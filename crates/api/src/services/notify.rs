//! One-time code delivery.
//!
//! Uses SMTP via lettre. Delivery is best-effort from the caller's
//! perspective: exactly one attempt per issuance, and a failure never rolls
//! back the already-persisted code.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use mercato_core::{Email, OtpCode};

use crate::config::SmtpConfig;

/// Errors that can occur when sending a code.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build the mail message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid mail address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Dispatches one-time codes to an address.
///
/// Trait seam so the integration tests can substitute a recording notifier.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    /// Send `code` to `to`. Exactly one delivery attempt.
    async fn send_otp(&self, to: &Email, code: &OtpCode) -> Result<(), NotifyError>;
}

/// SMTP-backed notifier.
#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotifier {
    /// Create a notifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be configured.
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl OtpNotifier for SmtpNotifier {
    async fn send_otp(&self, to: &Email, code: &OtpCode) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(to.as_str().to_owned()))?)
            .subject("Your OTP for Login")
            .body(format!(
                "Your OTP is {code}. It will expire in 5 minutes."
            ))?;

        self.mailer.send(message).await?;

        tracing::info!(to = %to, "OTP email sent");
        Ok(())
    }
}
