//! Data models for the API.

pub mod user;

pub use user::{CartEntry, UserRecord, UserView};
