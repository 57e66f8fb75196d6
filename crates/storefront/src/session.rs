//! Signed-in session and selected address, kept in local storage.

use std::sync::Arc;

use eggbucket_core::storage::keys;
use eggbucket_core::{Address, LocalStorage, PhoneNumber, StorageError};
use secrecy::{ExposeSecret, SecretString};

/// A signed-in customer.
#[derive(Clone)]
pub struct Session {
    /// Id token from the auth provider.
    pub token: SecretString,
    /// Phone number the customer signed in with.
    pub phone: PhoneNumber,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("phone", &self.phone)
            .finish()
    }
}

/// Reads and writes the session keys.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn LocalStorage>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// The stored session, if both the token and phone are present.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        let Some(token) = self.storage.get(keys::TOKEN)? else {
            return Ok(None);
        };
        let Some(raw_phone) = self.storage.get(keys::PHONE_NUMBER)? else {
            return Ok(None);
        };

        match PhoneNumber::parse(&raw_phone) {
            Ok(phone) => Ok(Some(Session {
                token: SecretString::from(token),
                phone,
            })),
            Err(e) => {
                tracing::warn!(error = %e, "Stored phone number is invalid, ignoring session");
                Ok(None)
            }
        }
    }

    /// Persist a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        self.storage
            .set(keys::TOKEN, session.token.expose_secret())?;
        self.storage.set(keys::PHONE_NUMBER, &session.phone.e164())
    }

    /// Sign out: drop the session and the selected address. The cart stays.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(keys::TOKEN)?;
        self.storage.remove(keys::PHONE_NUMBER)?;
        self.storage.remove(keys::SELECTED_ADDRESS)
    }

    /// Address chosen for the next order. An unreadable value counts as none.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn selected_address(&self) -> Result<Option<Address>, StorageError> {
        let Some(raw) = self.storage.get(keys::SELECTED_ADDRESS)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(address) => Ok(Some(address)),
            Err(e) => {
                tracing::warn!(error = %e, "Stored selected address is corrupt, ignoring");
                Ok(None)
            }
        }
    }

    /// Remember `address` as the delivery address.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn select_address(&self, address: &Address) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(address)?;
        self.storage.set(keys::SELECTED_ADDRESS, &encoded)
    }

    /// Forget the selected address.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear_selected_address(&self) -> Result<(), StorageError> {
        self.storage.remove(keys::SELECTED_ADDRESS)
    }
}
