//! One-time code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OtpError {
    /// The input is not exactly six characters long.
    #[error("one-time code must be exactly {expected} digits")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
    },
    /// The input contains a non-digit character.
    #[error("one-time code must contain only ASCII digits")]
    NonDigit,
}

/// A six-digit one-time login code.
///
/// The code is stored and compared as a string everywhere. Submitted codes
/// go through [`OtpCode::parse`] at the boundary, so a numeric-vs-string
/// mismatch can never reach the store comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 6;

    /// Parse an `OtpCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OtpError> {
        if s.len() != Self::LENGTH {
            return Err(OtpError::WrongLength {
                expected: Self::LENGTH,
            });
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpError::NonDigit);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OtpCode {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
