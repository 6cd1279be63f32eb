//! Cart route handlers.
//!
//! Every handler runs behind [`RequireSession`]; the store is only touched
//! after the bearer credential has been verified.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::middleware::RequireSession;
use crate::models::CartEntry;
use crate::services::CartService;
use crate::state::AppState;

/// Product payload for add-to-cart. The identifier comes from the client;
/// any extra fields are stored verbatim on the cart entry.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product: Option<ProductPayload>,
}

/// Update-quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// List the authenticated user's cart.
#[instrument(skip(state, user))]
pub async fn list(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
) -> Result<Json<Vec<CartEntry>>> {
    let cart = CartService::new(state.store());
    let entries = cart.list(&user.email).await?;
    Ok(Json(entries))
}

/// Add a product to the cart with quantity 1.
#[instrument(skip(state, user, req))]
pub async fn add(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    Json(req): Json<AddRequest>,
) -> Result<Json<Value>> {
    let product = req
        .product
        .ok_or_else(|| ApiError::Validation("Product data required".to_owned()))?;

    let cart = CartService::new(state.store());
    cart.add(&user.email, &product.id, product.extra).await?;

    Ok(Json(json!({ "message": "Product added to cart" })))
}

/// Remove a product from the cart by identifier.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let cart = CartService::new(state.store());
    let entries = cart.remove(&user.email, &id).await?;

    Ok(Json(json!({
        "message": "Product removed from cart",
        "cart": entries,
    })))
}

/// Set a cart entry's quantity.
#[instrument(skip(state, user, req))]
pub async fn update_quantity(
    State(state): State<AppState>,
    RequireSession(user): RequireSession,
    Path(id): Path<String>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<Value>> {
    let cart = CartService::new(state.store());
    let entries = cart.update_quantity(&user.email, &id, req.quantity).await?;

    Ok(Json(json!({
        "message": "Quantity updated",
        "cart": entries,
    })))
}
