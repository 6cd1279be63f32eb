//! In-memory user store.
//!
//! Mirrors the semantics of the MongoDB backend entry for entry. Identifier
//! matching is exact string comparison on both backends: `ProductId::parse`
//! canonicalizes hex-form ids, so no fuzzy matching happens here. Used by
//! the integration tests and handy for local development without a running
//! MongoDB.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use mercato_core::{Email, OtpCode, ProductId};

use super::{CartInsert, StoreError, UserStore};
use crate::models::{CartEntry, UserRecord};

/// User store backed by a process-local map.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(email.as_str()).cloned())
    }

    async fn upsert_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let record = users
            .entry(email.as_str().to_owned())
            .or_insert_with(|| UserRecord::new(email.clone()));
        record.otp = Some(code.clone());
        record.otp_expires_at = Some(expires_at.timestamp_millis());
        record.is_logged_in = false;
        Ok(())
    }

    async fn consume_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(email.as_str()) else {
            return Ok(false);
        };
        let matches = record.otp.as_ref() == Some(code)
            && record
                .otp_expires_at
                .is_some_and(|expires| expires > now.timestamp_millis());
        if !matches {
            return Ok(false);
        }
        record.otp = None;
        record.otp_expires_at = None;
        record.is_logged_in = true;
        Ok(true)
    }

    async fn set_logged_in(&self, email: &Email, logged_in: bool) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(email.as_str()) {
            Some(record) => {
                record.is_logged_in = logged_in;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_cart_entry(
        &self,
        email: &Email,
        entry: &CartEntry,
    ) -> Result<CartInsert, StoreError> {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(email.as_str()) else {
            return Ok(CartInsert::UserMissing);
        };
        if record.cart.iter().any(|e| e.id == entry.id) {
            return Ok(CartInsert::Duplicate);
        }
        record.cart.push(entry.clone());
        Ok(CartInsert::Inserted)
    }

    async fn remove_cart_entry(
        &self,
        email: &Email,
        id: &ProductId,
    ) -> Result<Option<Vec<CartEntry>>, StoreError> {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(email.as_str()) else {
            return Ok(None);
        };
        let before = record.cart.len();
        record.cart.retain(|e| e.id != *id);
        if record.cart.len() == before {
            return Ok(None);
        }
        Ok(Some(record.cart.clone()))
    }

    async fn set_cart_quantity(
        &self,
        email: &Email,
        id: &ProductId,
        quantity: u32,
    ) -> Result<Option<Vec<CartEntry>>, StoreError> {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(email.as_str()) else {
            return Ok(None);
        };
        let Some(entry) = record.cart.iter_mut().find(|e| e.id == *id) else {
            return Ok(None);
        };
        entry.quantity = quantity;
        Ok(Some(record.cart.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::Map;

    fn email() -> Email {
        Email::parse("a@x.com").unwrap()
    }

    fn code(s: &str) -> OtpCode {
        OtpCode::parse(s).unwrap()
    }

    fn entry(id: &str) -> CartEntry {
        CartEntry::new(ProductId::parse(id).unwrap(), Map::new())
    }

    async fn store_with_user() -> MemoryUserStore {
        let store = MemoryUserStore::new();
        store
            .upsert_otp(&email(), &code("111111"), Utc::now() + Duration::minutes(5))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_upsert_creates_record_with_empty_cart() {
        let store = store_with_user().await;
        let record = store.find_by_email(&email()).await.unwrap().unwrap();
        assert_eq!(record.otp, Some(code("111111")));
        assert!(record.cart.is_empty());
        assert!(!record.is_logged_in);
    }

    #[tokio::test]
    async fn test_reissue_overwrites_previous_code() {
        let store = store_with_user().await;
        store
            .upsert_otp(&email(), &code("222222"), Utc::now() + Duration::minutes(5))
            .await
            .unwrap();

        // The first code is no longer valid
        let consumed = store
            .consume_otp(&email(), &code("111111"), Utc::now())
            .await
            .unwrap();
        assert!(!consumed);

        let consumed = store
            .consume_otp(&email(), &code("222222"), Utc::now())
            .await
            .unwrap();
        assert!(consumed);
    }

    #[tokio::test]
    async fn test_consume_otp_is_single_use() {
        let store = store_with_user().await;
        assert!(
            store
                .consume_otp(&email(), &code("111111"), Utc::now())
                .await
                .unwrap()
        );
        // Replay fails
        assert!(
            !store
                .consume_otp(&email(), &code("111111"), Utc::now())
                .await
                .unwrap()
        );

        let record = store.find_by_email(&email()).await.unwrap().unwrap();
        assert!(record.otp.is_none());
        assert!(record.is_logged_in);
    }

    #[tokio::test]
    async fn test_consume_otp_expired() {
        let store = MemoryUserStore::new();
        store
            .upsert_otp(&email(), &code("111111"), Utc::now() - Duration::minutes(1))
            .await
            .unwrap();

        let consumed = store
            .consume_otp(&email(), &code("111111"), Utc::now())
            .await
            .unwrap();
        assert!(!consumed);
    }

    #[tokio::test]
    async fn test_insert_duplicate_rejected() {
        let store = store_with_user().await;
        assert_eq!(
            store.insert_cart_entry(&email(), &entry("p1")).await.unwrap(),
            CartInsert::Inserted
        );
        assert_eq!(
            store.insert_cart_entry(&email(), &entry("p1")).await.unwrap(),
            CartInsert::Duplicate
        );

        let record = store.find_by_email(&email()).await.unwrap().unwrap();
        assert_eq!(record.cart.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_user_missing() {
        let store = MemoryUserStore::new();
        assert_eq!(
            store.insert_cart_entry(&email(), &entry("p1")).await.unwrap(),
            CartInsert::UserMissing
        );
    }

    #[tokio::test]
    async fn test_remove_nonexistent_leaves_cart_unchanged() {
        let store = store_with_user().await;
        store
            .insert_cart_entry(&email(), &entry("p1"))
            .await
            .unwrap();

        let id = ProductId::parse("p2").unwrap();
        assert!(store.remove_cart_entry(&email(), &id).await.unwrap().is_none());

        let record = store.find_by_email(&email()).await.unwrap().unwrap();
        assert_eq!(record.cart.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_matches_canonicalized_hex_id() {
        let store = store_with_user().await;
        let hex = "67f3b2a19c8d4e0012345678";
        store
            .insert_cart_entry(&email(), &entry(hex))
            .await
            .unwrap();

        // Uppercase hex canonicalizes to the stored lowercase form
        let alt = ProductId::parse(&hex.to_uppercase()).unwrap();
        let cart = store.remove_cart_entry(&email(), &alt).await.unwrap();
        assert_eq!(cart, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_set_quantity_frame_property() {
        let store = store_with_user().await;
        let mut first = entry("p1");
        first.extra.insert("name".into(), "Mango".into());
        store.insert_cart_entry(&email(), &first).await.unwrap();
        store
            .insert_cart_entry(&email(), &entry("p2"))
            .await
            .unwrap();

        let id = ProductId::parse("p2").unwrap();
        let cart = store
            .set_cart_quantity(&email(), &id, 4)
            .await
            .unwrap()
            .unwrap();

        let p1 = cart.iter().find(|e| e.id.as_str() == "p1").unwrap();
        let p2 = cart.iter().find(|e| e.id.as_str() == "p2").unwrap();
        assert_eq!(p1.quantity, 1);
        assert_eq!(p1.extra.get("name"), Some(&"Mango".into()));
        assert_eq!(p2.quantity, 4);
    }

    #[tokio::test]
    async fn test_set_quantity_missing_entry() {
        let store = store_with_user().await;
        let id = ProductId::parse("ghost").unwrap();
        assert!(
            store
                .set_cart_quantity(&email(), &id, 2)
                .await
                .unwrap()
                .is_none()
        );
    }
}
