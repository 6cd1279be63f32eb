//! Core types for Mercato.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod otp;
pub mod product;

pub use email::{Email, EmailError};
pub use otp::{OtpCode, OtpError};
pub use product::{ProductId, ProductIdError};
