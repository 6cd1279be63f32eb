//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::services::notify::OtpNotifier;
use crate::services::tokens::TokenSigner;
use crate::store::UserStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// injected store, notifier, and token signer. There is no global
/// connection state: everything a handler needs arrives through here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn UserStore>,
    notifier: Arc<dyn OtpNotifier>,
    tokens: TokenSigner,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration (source of the signing secret)
    /// * `store` - Document store backend
    /// * `notifier` - One-time code notifier
    #[must_use]
    pub fn new(
        config: &ApiConfig,
        store: Arc<dyn UserStore>,
        notifier: Arc<dyn OtpNotifier>,
    ) -> Self {
        let tokens = TokenSigner::new(&config.jwt_secret);

        Self {
            inner: Arc::new(AppStateInner {
                store,
                notifier,
                tokens,
            }),
        }
    }

    /// Get a reference to the user store.
    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the OTP notifier.
    #[must_use]
    pub fn notifier(&self) -> &dyn OtpNotifier {
        self.inner.notifier.as_ref()
    }

    /// Get a reference to the session token signer.
    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }
}
