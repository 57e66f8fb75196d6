//! Durable local key-value storage.
//!
//! The storefront keeps a handful of values on the customer's device: the
//! session, the cart and the selected address. They live behind
//! [`LocalStorage`] so the cart store does not care whether they end up in a
//! file or in a map.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Well-known storage keys.
pub mod keys {
    /// Session token from the auth provider.
    pub const TOKEN: &str = "token";
    /// Signed-in phone number (E.164).
    pub const PHONE_NUMBER: &str = "phoneNumber";
    /// Cart lines. Written only by [`crate::CartStore`].
    pub const CART_ITEMS: &str = "cartItems";
    /// Address chosen for the next order.
    pub const SELECTED_ADDRESS: &str = "selectedAddress";
}

/// Errors raised by a storage backend.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contents are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

/// String key-value store that survives restarts.
///
/// Implementations persist every `set`/`remove` before returning.
pub trait LocalStorage: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write was not persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal was not persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock()?.remove(key);
        Ok(())
    }
}
