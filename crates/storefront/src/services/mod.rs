//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Phone sign-in (send code, verify code)
//! - `checkout` - Turning the cart into an order
//! - `geocode` - Address drafts from coordinates

pub mod auth;
pub mod checkout;
pub mod geocode;
