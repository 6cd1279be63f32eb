//! MongoDB-backed user store.
//!
//! Every mutation is one conditional `update_one` against the user document,
//! so concurrent requests race at the store rather than in process:
//!
//! - OTP issuance is an upsert (`$set` + `$setOnInsert`).
//! - OTP consumption filters on the stored code and its expiry, making the
//!   code single-use without a read-modify-write cycle.
//! - Cart insertion filters on the absence of the identifier, so two
//!   concurrent adds of the same product cannot both succeed.
//! - Removal `$pull`s by identifier, matching both the opaque string form
//!   and the ObjectId form in a single `$in` predicate.

use chrono::{DateTime, Utc};
use mongodb::{
    Client, Database,
    bson::{self, Bson, doc, oid::ObjectId},
};
use secrecy::ExposeSecret;

use mercato_core::{Email, OtpCode, ProductId};

use super::{CartInsert, StoreError, UserStore};
use crate::config::ApiConfig;
use crate::models::{CartEntry, UserRecord};

/// Production user store over a MongoDB collection.
pub struct MongoUserStore {
    database: Database,
    collection: mongodb::Collection<UserRecord>,
}

impl MongoUserStore {
    /// Connect to MongoDB and bind the configured database/collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the connection string is rejected.
    pub async fn connect(config: &ApiConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(config.mongodb_uri.expose_secret()).await?;
        let database = client.database(&config.db_name);
        let collection = database.collection(&config.collection);
        Ok(Self {
            database,
            collection,
        })
    }
}

/// Both stored representations of a cart-entry identifier.
///
/// Entries written through this API store the id as its canonical string
/// (`ProductId::parse` lowercases hex-form ids), so the string form alone
/// matches them for any case variant of the request. Records written by
/// earlier deployments may hold the store-native ObjectId instead; the
/// second form covers those, and a single `$in` keeps the match atomic.
fn id_forms(id: &ProductId) -> Vec<Bson> {
    let mut forms = vec![Bson::String(id.as_str().to_owned())];
    if let Ok(oid) = ObjectId::parse_str(id.as_str()) {
        forms.push(Bson::ObjectId(oid));
    }
    forms
}

#[async_trait::async_trait]
impl UserStore for MongoUserStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserRecord>, StoreError> {
        let record = self
            .collection
            .find_one(doc! { "email": email.as_str() })
            .await?;
        Ok(record)
    }

    async fn upsert_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let update = doc! {
            "$set": {
                "otp": code.as_str(),
                "otp_expires_at": expires_at.timestamp_millis(),
                "isLoggedIn": false,
            },
            "$setOnInsert": {
                "email": email.as_str(),
                "cart": [],
            },
        };

        self.collection
            .update_one(doc! { "email": email.as_str() }, update)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn consume_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let filter = doc! {
            "email": email.as_str(),
            "otp": code.as_str(),
            "otp_expires_at": { "$gt": now.timestamp_millis() },
        };
        let update = doc! {
            "$set": {
                "otp": Bson::Null,
                "otp_expires_at": Bson::Null,
                "isLoggedIn": true,
            },
        };

        let result = self.collection.update_one(filter, update).await?;
        Ok(result.modified_count > 0)
    }

    async fn set_logged_in(&self, email: &Email, logged_in: bool) -> Result<bool, StoreError> {
        let result = self
            .collection
            .update_one(
                doc! { "email": email.as_str() },
                doc! { "$set": { "isLoggedIn": logged_in } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn insert_cart_entry(
        &self,
        email: &Email,
        entry: &CartEntry,
    ) -> Result<CartInsert, StoreError> {
        let entry_doc = bson::to_document(entry)
            .map_err(|e| StoreError::DataCorruption(format!("unserializable cart entry: {e}")))?;

        // Conditional insert: only matches when no entry carries this
        // identifier in either representation.
        let filter = doc! {
            "email": email.as_str(),
            "cart.id": { "$nin": id_forms(&entry.id) },
        };

        let result = self
            .collection
            .update_one(filter, doc! { "$push": { "cart": entry_doc } })
            .await?;

        if result.modified_count > 0 {
            return Ok(CartInsert::Inserted);
        }

        // Zero-effect update: disambiguate with one targeted lookup.
        match self.find_by_email(email).await? {
            Some(_) => Ok(CartInsert::Duplicate),
            None => Ok(CartInsert::UserMissing),
        }
    }

    async fn remove_cart_entry(
        &self,
        email: &Email,
        id: &ProductId,
    ) -> Result<Option<Vec<CartEntry>>, StoreError> {
        let update = doc! {
            "$pull": { "cart": { "id": { "$in": id_forms(id) } } },
        };

        let result = self
            .collection
            .update_one(doc! { "email": email.as_str() }, update)
            .await?;

        if result.modified_count == 0 {
            // Unknown user or no matching entry; no further store calls.
            return Ok(None);
        }

        let record = self.find_by_email(email).await?.ok_or_else(|| {
            StoreError::DataCorruption("user record vanished after cart removal".to_owned())
        })?;
        Ok(Some(record.cart))
    }

    async fn set_cart_quantity(
        &self,
        email: &Email,
        id: &ProductId,
        quantity: u32,
    ) -> Result<Option<Vec<CartEntry>>, StoreError> {
        let filter = doc! {
            "email": email.as_str(),
            "cart.id": { "$in": id_forms(id) },
        };
        let update = doc! {
            "$set": { "cart.$.quantity": quantity },
        };

        let result = self.collection.update_one(filter, update).await?;

        if result.matched_count == 0 {
            return Ok(None);
        }

        let record = self.find_by_email(email).await?.ok_or_else(|| {
            StoreError::DataCorruption("user record vanished after quantity update".to_owned())
        })?;
        Ok(Some(record.cart))
    }
}
