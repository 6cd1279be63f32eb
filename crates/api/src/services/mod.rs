//! Business logic services.

pub mod auth;
pub mod cart;
pub mod notify;
pub mod tokens;

pub use auth::AuthService;
pub use cart::CartService;
pub use notify::{OtpNotifier, SmtpNotifier};
pub use tokens::TokenSigner;
