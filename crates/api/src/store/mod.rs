//! Document store access for user records.
//!
//! All mutation goes through single conditional updates against one user
//! document (match-then-mutate in one round trip). That is the concurrency
//! boundary: no in-process locks are needed and two racing requests are
//! serialized by the store itself.

pub mod memory;
pub mod mongo;

pub use memory::MemoryUserStore;
pub use mongo::MongoUserStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use mercato_core::{Email, OtpCode, ProductId};

use crate::models::{CartEntry, UserRecord};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from the MongoDB driver.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Data in the store is corrupted or cannot be (de)serialized.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Outcome of a conditional cart insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartInsert {
    /// The entry was appended.
    Inserted,
    /// An entry with the same identifier already exists.
    Duplicate,
    /// No user record exists for this email.
    UserMissing,
}

/// Email-keyed access to user records.
///
/// Injected into the application state as a trait object so the production
/// MongoDB backend and the in-memory test backend are interchangeable.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Check connectivity (used by the readiness probe).
    async fn ping(&self) -> Result<(), StoreError>;

    /// Fetch a user record by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, StoreError>;

    /// Store a fresh one-time code for this email, creating the record with
    /// an empty cart if absent. Any previously stored code is overwritten
    /// and the session flag is reset.
    async fn upsert_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Atomically clear a matching, unexpired code and mark the session
    /// flag. Returns `false` on a zero-effect update (unknown email, wrong
    /// code, replayed code, or expired code).
    async fn consume_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Set the display-only session flag. Returns `false` if no record
    /// matched.
    async fn set_logged_in(&self, email: &Email, logged_in: bool) -> Result<bool, StoreError>;

    /// Append a cart entry unless one with the same identifier exists.
    /// The existence check and the append happen in one conditional update.
    async fn insert_cart_entry(
        &self,
        email: &Email,
        entry: &CartEntry,
    ) -> Result<CartInsert, StoreError>;

    /// Remove the entry matching `id` (opaque string or store-native object
    /// id form) in one conditional update. Returns the updated cart, or
    /// `None` if the update had zero effect.
    async fn remove_cart_entry(
        &self,
        email: &Email,
        id: &ProductId,
    ) -> Result<Option<Vec<CartEntry>>, StoreError>;

    /// Set the quantity of the entry matching `id` in place. Returns the
    /// updated cart, or `None` if no entry matched.
    async fn set_cart_quantity(
        &self,
        email: &Email,
        id: &ProductId,
        quantity: u32,
    ) -> Result<Option<Vec<CartEntry>>, StoreError>;
}
