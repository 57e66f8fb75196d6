//! Application state shared across handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use eggbucket_core::{CartError, CartStore, LocalStorage, ShippingPolicy, StorageError};

use crate::backend::BackendClient;
use crate::config::StorefrontConfig;
use crate::services::auth::{PendingChallenge, PhoneAuthClient};
use crate::services::geocode::{GeocodeClient, GeocodeError};
use crate::session::SessionStore;
use crate::storage::FileStorage;

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("geocoder error: {0}")]
    Geocoder(#[from] GeocodeError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The cart sits behind a `std` mutex; lock it
/// with [`AppState::cart`] and never hold the guard across an `.await`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cart: Mutex<CartStore>,
    sessions: SessionStore,
    pending: Mutex<Option<PendingChallenge>>,
    backend: BackendClient,
    auth: PhoneAuthClient,
    geocoder: GeocodeClient,
    order_in_flight: AtomicBool,
}

impl AppState {
    /// Create the application state backed by the file store in
    /// `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be opened or a client
    /// fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::open(&config.data_dir)?);
        Self::with_storage(config, storage)
    }

    /// Create the application state on top of an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart slot cannot be reset or a client fails
    /// to build.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn LocalStorage>,
    ) -> Result<Self, StateError> {
        let shipping = ShippingPolicy::from_fee(config.shipping_fee);
        let cart = open_cart(Arc::clone(&storage), shipping)?;

        let backend = BackendClient::new(&config.backend);
        let auth = PhoneAuthClient::new(&config.auth);
        let geocoder = GeocodeClient::new(&config.geocoder)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                sessions: SessionStore::new(storage),
                config,
                cart: Mutex::new(cart),
                pending: Mutex::new(None),
                backend,
                auth,
                geocoder,
                order_in_flight: AtomicBool::new(false),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Lock the cart.
    ///
    /// # Errors
    ///
    /// Returns `Poisoned` if a previous holder panicked.
    pub fn cart(&self) -> Result<MutexGuard<'_, CartStore>, StorageError> {
        Ok(self.inner.cart.lock()?)
    }

    /// Get the session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Replace the pending sign-in challenge.
    ///
    /// # Errors
    ///
    /// Returns `Poisoned` if a previous holder panicked.
    pub fn set_pending_challenge(
        &self,
        challenge: Option<PendingChallenge>,
    ) -> Result<(), StorageError> {
        *self.inner.pending.lock()? = challenge;
        Ok(())
    }

    /// The pending sign-in challenge, if a code was sent.
    ///
    /// # Errors
    ///
    /// Returns `Poisoned` if a previous holder panicked.
    pub fn pending_challenge(&self) -> Result<Option<PendingChallenge>, StorageError> {
        Ok(self.inner.pending.lock()?.clone())
    }

    /// Get the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get the phone auth client.
    #[must_use]
    pub fn auth(&self) -> &PhoneAuthClient {
        &self.inner.auth
    }

    /// Get the reverse geocoding client.
    #[must_use]
    pub fn geocoder(&self) -> &GeocodeClient {
        &self.inner.geocoder
    }

    /// Claim the order submission slot. `None` if an order is already in
    /// flight; the slot is released when the returned guard drops.
    #[must_use]
    pub fn begin_order(&self) -> Option<OrderGuard<'_>> {
        self.inner
            .order_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| OrderGuard {
                flag: &self.inner.order_in_flight,
            })
    }

    /// Whether an order submission is running.
    #[must_use]
    pub fn order_in_flight(&self) -> bool {
        self.inner.order_in_flight.load(Ordering::Acquire)
    }
}

/// Holds the order submission slot until dropped.
#[derive(Debug)]
pub struct OrderGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for OrderGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Rehydrate the cart. A corrupt stored cart is replaced with an empty one.
fn open_cart(
    storage: Arc<dyn LocalStorage>,
    shipping: ShippingPolicy,
) -> Result<CartStore, StorageError> {
    match CartStore::open(Arc::clone(&storage), shipping) {
        Ok(cart) => Ok(cart),
        Err(CartError::Storage(e)) => Err(e),
        Err(CartError::Corrupt(e)) => {
            tracing::warn!(error = %e, "Stored cart is corrupt, starting with an empty cart");
            let mut cart = CartStore::empty(storage, shipping);
            cart.clear().map_err(|e| match e {
                CartError::Storage(e) => e,
                CartError::Corrupt(e) => StorageError::Serialization(e),
            })?;
            Ok(cart)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use eggbucket_core::MemoryStorage;
    use eggbucket_core::storage::keys;
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use url::Url;

    use super::*;
    use crate::config::{AuthConfig, BackendConfig, GeocoderConfig};

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            data_dir: PathBuf::from("unused"),
            allowed_origin: None,
            shipping_fee: Decimal::ZERO,
            backend: BackendConfig {
                base_url: Url::parse("http://127.0.0.1:9").unwrap(),
                catalog_ttl: Duration::from_secs(300),
            },
            auth: AuthConfig {
                base_url: Url::parse("http://127.0.0.1:9").unwrap(),
                api_key: SecretString::from("test-key"),
                challenge_ttl: Duration::from_secs(300),
            },
            geocoder: GeocoderConfig {
                base_url: Url::parse("http://127.0.0.1:9").unwrap(),
            },
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_order_guard_is_exclusive_and_released_on_drop() {
        let state =
            AppState::with_storage(test_config(), Arc::new(MemoryStorage::new())).unwrap();

        let guard = state.begin_order().unwrap();
        assert!(state.order_in_flight());
        assert!(state.begin_order().is_none());

        drop(guard);
        assert!(!state.order_in_flight());
        assert!(state.begin_order().is_some());
    }

    #[test]
    fn test_corrupt_cart_is_reset() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::CART_ITEMS, "{not json").unwrap();

        let state = AppState::with_storage(test_config(), storage.clone()).unwrap();
        assert!(state.cart().unwrap().is_empty());
        assert_eq!(storage.get(keys::CART_ITEMS).unwrap().as_deref(), Some("[]"));
    }
}
