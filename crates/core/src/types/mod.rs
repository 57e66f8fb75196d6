//! Core types for EggBucket.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! entities exchanged with the backend.

pub mod address;
pub mod id;
pub mod order;
pub mod phone;
pub mod price;
pub mod product;
pub mod profile;
pub mod status;

pub use address::{Address, AddressError, Coordinates, FullAddress};
pub use id::*;
pub use order::{OrderLines, OrderPayload, OrderRecord};
pub use phone::{PhoneError, PhoneNumber};
pub use price::{CurrencyCode, Price};
pub use product::Product;
pub use profile::{CustomerProfile, ProfileError, ProfileUpdate};
pub use status::{Gender, OrderOutcome};
