//! Product identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ProductIdError {
    /// The input string is empty.
    #[error("product id cannot be empty")]
    Empty,
}

/// A client-supplied product identifier.
///
/// The server never generates these; they arrive from the client and may be
/// an opaque string (`"p1"`) or the hex form of a store-native object id.
/// Hex-form identifiers are canonicalized to lowercase at the boundary, so
/// case variants of the same object id compare equal as plain strings on
/// every backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Length of an object id's hex form.
    const OBJECT_ID_HEX_LENGTH: usize = 24;

    /// Parse a `ProductId` from a string.
    ///
    /// 24-hex inputs are lowercased; everything else is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ProductIdError::Empty`] if the input is empty.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        if s.is_empty() {
            return Err(ProductIdError::Empty);
        }
        if s.len() == Self::OBJECT_ID_HEX_LENGTH && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Ok(Self(s.to_ascii_lowercase()));
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
