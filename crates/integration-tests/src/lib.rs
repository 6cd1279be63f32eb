//! Integration tests for Mercato.
//!
//! The tests drive the full router in-process: the real handlers, the real
//! extractors, and the real services, with the in-memory store standing in
//! for MongoDB and a recording notifier standing in for SMTP. No external
//! services are required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mercato-integration-tests
//! ```

use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use mercato_api::config::{ApiConfig, SmtpConfig};
use mercato_api::services::notify::{NotifyError, OtpNotifier};
use mercato_api::state::AppState;
use mercato_api::store::MemoryUserStore;
use mercato_core::{Email, OtpCode};

/// Notifier that records every dispatched code instead of sending mail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(Email, OtpCode)>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent code dispatched to this address, if any.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    pub fn last_code_for(&self, email: &str) -> Option<OtpCode> {
        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .iter()
            .rev()
            .find(|(to, _)| to.as_str() == email)
            .map(|(_, code)| code.clone())
    }

    /// Total number of dispatched codes.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("notifier lock poisoned").len()
    }
}

#[async_trait]
impl OtpNotifier for RecordingNotifier {
    async fn send_otp(&self, to: &Email, code: &OtpCode) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .push((to.clone(), code.clone()));
        Ok(())
    }
}

/// A fully wired application with test doubles at the seams.
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Build the router against an empty in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if the fixed test configuration fails to parse.
    #[must_use]
    pub fn new() -> Self {
        let config = ApiConfig {
            mongodb_uri: SecretString::from("mongodb://localhost:27017"),
            db_name: "mercato_test".to_string(),
            collection: "users".to_string(),
            host: "127.0.0.1".parse::<IpAddr>().expect("valid test host"),
            port: 0,
            jwt_secret: SecretString::from("0RNpVCEqeTqzXwZMhbMYtxVhRC1Zfl0e"),
            smtp: SmtpConfig {
                host: "smtp.test".to_string(),
                port: 587,
                username: "mailer".to_string(),
                password: SecretString::from("hunter2"),
                from_address: "noreply@mercato.test".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let notifier = Arc::new(RecordingNotifier::new());
        let state = AppState::new(
            &config,
            Arc::new(MemoryUserStore::new()),
            Arc::clone(&notifier) as Arc<dyn OtpNotifier>,
        );
        let app = mercato_api::routes::routes().with_state(state.clone());

        Self {
            app,
            state,
            notifier,
        }
    }

    /// Send a request and return the status plus the parsed JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the response body is not
    /// valid JSON.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request construction");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collection")
            .to_bytes();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, json)
    }

    /// Run the login flow for `email` and return a session token.
    ///
    /// # Panics
    ///
    /// Panics if any step of the flow does not succeed.
    pub async fn login(&self, email: &str) -> String {
        let (status, _) = self
            .request("POST", "/login", None, Some(serde_json::json!({ "email": email })))
            .await;
        assert_eq!(status, StatusCode::OK);

        let code = self
            .notifier
            .last_code_for(email)
            .expect("a code was dispatched");

        let (status, body) = self
            .request(
                "POST",
                "/verify-otp",
                None,
                Some(serde_json::json!({ "email": email, "otp": code.as_str() })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["token"]
            .as_str()
            .expect("token in verification response")
            .to_owned()
    }
}
