//! Cart service.
//!
//! All operations run against the authenticated user's record. Uniqueness
//! and identifier matching are enforced by the store's conditional updates;
//! this layer validates input and maps zero-effect updates to errors.

use thiserror::Error;

use mercato_core::{Email, ProductId, ProductIdError};
use serde_json::{Map, Value};

use crate::models::CartEntry;
use crate::store::{CartInsert, StoreError, UserStore};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product identifier failed boundary validation.
    #[error("invalid product: {0}")]
    InvalidProduct(#[from] ProductIdError),

    /// Requested quantity is not positive.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// An entry with this identifier already exists.
    #[error("duplicate cart entry")]
    Duplicate,

    /// No record exists for the authenticated email.
    #[error("user not found")]
    UserNotFound,

    /// No cart entry matched the identifier.
    #[error("cart entry not found")]
    EntryNotFound,

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cart operations over the injected store.
pub struct CartService<'a> {
    store: &'a dyn UserStore,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: &'a dyn UserStore) -> Self {
        Self { store }
    }

    /// Fetch the user's cart. An absent cart field is an empty sequence,
    /// not an error; an absent user is.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if no record exists.
    pub async fn list(&self, email: &Email) -> Result<Vec<CartEntry>, CartError> {
        let record = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(CartError::UserNotFound)?;
        Ok(record.cart)
    }

    /// Append a product with `quantity = 1`, rejecting duplicates.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Duplicate` if an entry with the same identifier
    /// exists, `CartError::UserNotFound` if the record is absent.
    pub async fn add(
        &self,
        email: &Email,
        id: &str,
        extra: Map<String, Value>,
    ) -> Result<(), CartError> {
        let id = ProductId::parse(id)?;
        let entry = CartEntry::new(id, extra);

        match self.store.insert_cart_entry(email, &entry).await? {
            CartInsert::Inserted => {
                tracing::debug!(email = %email, id = %entry.id, "cart entry added");
                Ok(())
            }
            CartInsert::Duplicate => Err(CartError::Duplicate),
            CartInsert::UserMissing => Err(CartError::UserNotFound),
        }
    }

    /// Remove the entry matching `id` and return the updated cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::EntryNotFound` on a zero-effect removal.
    pub async fn remove(&self, email: &Email, id: &str) -> Result<Vec<CartEntry>, CartError> {
        let id = ProductId::parse(id)?;
        self.store
            .remove_cart_entry(email, &id)
            .await?
            .ok_or(CartError::EntryNotFound)
    }

    /// Set the quantity of the entry matching `id` and return the updated
    /// cart. Quantities below 1 are rejected.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for non-positive quantities and
    /// `CartError::EntryNotFound` when no entry matched.
    pub async fn update_quantity(
        &self,
        email: &Email,
        id: &str,
        quantity: u32,
    ) -> Result<Vec<CartEntry>, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }
        let id = ProductId::parse(id)?;
        self.store
            .set_cart_quantity(email, &id, quantity)
            .await?
            .ok_or(CartError::EntryNotFound)
    }
}
