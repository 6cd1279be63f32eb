//! User record and cart entry models.
//!
//! The document store keeps one record per email. Wire field names
//! (`isLoggedIn`, `cart`) match the stored documents, so the same structs
//! serve both the store layer and API responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use mercato_core::{Email, OtpCode, ProductId};

/// One product reference plus quantity within a user's cart.
///
/// The identifier originates from the client; any additional product fields
/// supplied at add time are stored verbatim and echoed back on reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartEntry {
    /// Client-supplied product identifier.
    pub id: ProductId,
    /// Positive quantity, 1 on insertion.
    pub quantity: u32,
    /// Arbitrary extra product fields, stored verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartEntry {
    /// Create a new entry with the default quantity of 1.
    #[must_use]
    pub fn new(id: ProductId, extra: Map<String, Value>) -> Self {
        Self {
            id,
            quantity: 1,
            extra,
        }
    }
}

/// A user record, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identifier, immutable once created.
    pub email: Email,
    /// Current one-time code; cleared on successful verification.
    #[serde(default)]
    pub otp: Option<OtpCode>,
    /// Code expiry as epoch milliseconds; cleared with the code.
    #[serde(default)]
    pub otp_expires_at: Option<i64>,
    /// Best-effort display flag. Authorization decisions never depend on
    /// this; the bearer token is the sole credential.
    #[serde(default, rename = "isLoggedIn")]
    pub is_logged_in: bool,
    /// Ordered cart entries.
    #[serde(default)]
    pub cart: Vec<CartEntry>,
}

impl UserRecord {
    /// Create a fresh record with an empty cart.
    #[must_use]
    pub const fn new(email: Email) -> Self {
        Self {
            email,
            otp: None,
            otp_expires_at: None,
            is_logged_in: false,
            cart: Vec::new(),
        }
    }
}

/// Client-visible view of a user record.
///
/// Never includes the OTP fields.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub email: Email,
    #[serde(rename = "isLoggedIn")]
    pub is_logged_in: bool,
    pub cart: Vec<CartEntry>,
}

impl From<UserRecord> for UserView {
    fn from(record: UserRecord) -> Self {
        Self {
            email: record.email,
            is_logged_in: record.is_logged_in,
            cart: record.cart,
        }
    }
}
