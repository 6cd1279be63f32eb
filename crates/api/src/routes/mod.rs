//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health              - Liveness check
//! GET    /health/ready        - Readiness check (pings the store)
//!
//! # Auth
//! POST   /login               - Request a one-time code by email
//! POST   /verify-otp          - Exchange the code for a session token
//! POST   /logout              - Clear the display-only session flag (bearer)
//!
//! # Cart (bearer)
//! GET    /cart                - List the authenticated user's cart
//! POST   /cart/add            - Add a product (quantity 1, duplicates rejected)
//! DELETE /cart/remove/{id}    - Remove a product by identifier
//! PATCH  /cart/update/{id}    - Set a product's quantity
//! ```

pub mod auth;
pub mod cart;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::list))
        .route("/add", post(cart::add))
        .route("/remove/{id}", delete(cart::remove))
        .route("/update/{id}", patch(cart::update_quantity))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth_routes())
        .nest("/cart", cart_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies store connectivity before returning OK.
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
