//! EggBucket Core - Domain types and the cart store.
//!
//! This crate provides the types shared by all EggBucket components:
//! - `storefront` - Local storefront shell (JSON API, backend clients)
//! - `cli` - Maintenance tools for the local data directory
//!
//! # Architecture
//!
//! The core crate performs no network I/O. Durable state is reached only
//! through the [`storage::LocalStorage`] trait, so the cart store can be
//! driven by an in-memory map in tests and by a file on a customer device.
//!
//! # Modules
//!
//! - [`types`] - Newtypes and entities: product ids, prices, phone numbers,
//!   addresses, profiles, orders
//! - [`cart`] - The write-through cart store
//! - [`storage`] - Local key-value storage trait and well-known keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod storage;
pub mod types;

pub use cart::{CartError, CartLine, CartStore, ShippingPolicy, Totals};
pub use storage::{LocalStorage, MemoryStorage, StorageError};
pub use types::*;
