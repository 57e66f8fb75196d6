//! The cart store.
//!
//! [`CartStore`] is the only owner of the cart. It keeps the lines in memory
//! in insertion order and mirrors them to [`keys::CART_ITEMS`] on every
//! mutation. A mutation is built on a copy of the lines, written to storage,
//! and only then swapped in, so a failed write leaves the cart as it was.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use eggbucket_core::{CartStore, MemoryStorage, Price, Product, ProductId, ShippingPolicy};
//! use rust_decimal::Decimal;
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut cart = CartStore::open(storage, ShippingPolicy::Free).unwrap();
//!
//! let six = Product {
//!     id: ProductId::new("E6"),
//!     name: "6 Eggs".to_owned(),
//!     price: Price::inr(Decimal::new(42, 0)),
//!     original_price: None,
//!     stock: 10,
//!     image: "/images/six.jpg".to_owned(),
//! };
//!
//! cart.add_or_increment(&six).unwrap();
//! cart.add_or_increment(&six).unwrap();
//! assert_eq!(cart.totals().subtotal.amount, Decimal::new(84, 0));
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::storage::{LocalStorage, StorageError, keys};
use crate::types::{OrderLines, Price, Product, ProductId, RawProductId};

/// Errors from cart operations.
#[derive(thiserror::Error, Debug)]
pub enum CartError {
    /// The persisted cart could not be parsed.
    #[error("stored cart is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// Reading or writing the persisted cart failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One product in the cart.
///
/// Display fields are copied from the catalog when the line is created and
/// never refreshed. Serialized as `{id, name, price, image, quantity}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(deserialize_with = "product_id_from_raw")]
    pub id: ProductId,
    pub name: String,
    /// Unit price in rupees.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartLine {
    /// Snapshot a catalog product as a new line.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price.amount,
            image: product.image.clone(),
            quantity,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

fn product_id_from_raw<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ProductId, D::Error> {
    RawProductId::deserialize(deserializer).map(ProductId::from)
}

/// Shipping charged on a non-empty cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShippingPolicy {
    #[default]
    Free,
    Flat(Decimal),
}

impl ShippingPolicy {
    /// Build a policy from a configured fee; zero or less means free.
    #[must_use]
    pub fn from_fee(fee: Decimal) -> Self {
        if fee > Decimal::ZERO {
            Self::Flat(fee)
        } else {
            Self::Free
        }
    }

    const fn fee(self) -> Decimal {
        match self {
            Self::Free => Decimal::ZERO,
            Self::Flat(fee) => fee,
        }
    }
}

/// Derived cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

/// Write-through cart store.
pub struct CartStore {
    lines: Vec<CartLine>,
    storage: Arc<dyn LocalStorage>,
    shipping: ShippingPolicy,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines)
            .field("shipping", &self.shipping)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// An empty cart that has not read storage. The first mutation overwrites
    /// whatever is stored.
    #[must_use]
    pub fn empty(storage: Arc<dyn LocalStorage>, shipping: ShippingPolicy) -> Self {
        Self {
            lines: Vec::new(),
            storage,
            shipping,
        }
    }

    /// Rehydrate the cart from storage.
    ///
    /// Lines with quantity 0 are dropped and duplicate ids merged.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Corrupt`] if the stored value is not a cart, or
    /// [`CartError::Storage`] if storage cannot be read.
    pub fn open(
        storage: Arc<dyn LocalStorage>,
        shipping: ShippingPolicy,
    ) -> Result<Self, CartError> {
        let lines = match storage.get(keys::CART_ITEMS)? {
            Some(raw) if !raw.trim().is_empty() => {
                let stored: Vec<CartLine> =
                    serde_json::from_str(&raw).map_err(CartError::Corrupt)?;
                normalize(stored)
            }
            _ => Vec::new(),
        };

        Ok(Self {
            lines,
            storage,
            shipping,
        })
    }

    /// Add one of `product`, creating the line if needed.
    ///
    /// Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn add_or_increment(&mut self, product: &Product) -> Result<u32, CartError> {
        self.add_quantity(product, 1)
    }

    /// Add `quantity` of `product`, creating the line if needed.
    ///
    /// A quantity of 0 changes nothing. Quantities saturate at `u32::MAX`.
    /// Stock is not checked here. Returns the line's quantity afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn add_quantity(&mut self, product: &Product, quantity: u32) -> Result<u32, CartError> {
        if quantity == 0 {
            return Ok(self.quantity_of(&product.id));
        }

        let mut next = self.lines.clone();
        let new_quantity = match next.iter_mut().find(|l| l.id == product.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.quantity
            }
            None => {
                next.push(CartLine::from_product(product, quantity));
                quantity
            }
        };

        self.commit(next)?;
        Ok(new_quantity)
    }

    /// Add one to an existing line. Returns `None` if the product is not in
    /// the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn increment(&mut self, id: &ProductId) -> Result<Option<u32>, CartError> {
        let mut next = self.lines.clone();
        let Some(line) = next.iter_mut().find(|l| &l.id == id) else {
            return Ok(None);
        };
        line.quantity = line.quantity.saturating_add(1);
        let quantity = line.quantity;

        self.commit(next)?;
        Ok(Some(quantity))
    }

    /// Remove one of `id`. The line is deleted when its quantity reaches 0.
    /// Absent ids are ignored.
    ///
    /// Returns the remaining quantity (0 when the line was deleted or absent).
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn decrement(&mut self, id: &ProductId) -> Result<u32, CartError> {
        let Some(index) = self.lines.iter().position(|l| &l.id == id) else {
            return Ok(0);
        };

        let mut next = self.lines.clone();
        let remaining = match next.get_mut(index) {
            Some(line) if line.quantity > 1 => {
                line.quantity -= 1;
                line.quantity
            }
            _ => {
                next.remove(index);
                0
            }
        };

        self.commit(next)?;
        Ok(remaining)
    }

    /// Delete the line for `id`. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn remove(&mut self, id: &ProductId) -> Result<bool, CartError> {
        if !self.contains(id) {
            return Ok(false);
        }

        let next = self.lines.iter().filter(|l| &l.id != id).cloned().collect();
        self.commit(next)?;
        Ok(true)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.commit(Vec::new())
    }

    /// Take the quantities of a placed order out of the cart.
    ///
    /// Lines added after `ordered` was taken survive, as do units added to
    /// an ordered line. A line drops out when its quantity reaches 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart could not be persisted.
    pub fn remove_ordered(&mut self, ordered: &OrderLines) -> Result<(), CartError> {
        let next: Vec<CartLine> = self
            .lines
            .iter()
            .filter_map(|line| {
                let taken = ordered.get(&line.id).copied().unwrap_or(0);
                let quantity = line.quantity.saturating_sub(taken);
                (quantity > 0).then(|| CartLine {
                    quantity,
                    ..line.clone()
                })
            })
            .collect();

        if next == self.lines {
            return Ok(());
        }
        self.commit(next)
    }

    /// Subtotal, shipping and total. Shipping is charged only on a
    /// non-empty cart.
    #[must_use]
    pub fn totals(&self) -> Totals {
        let subtotal: Decimal = self.lines.iter().map(CartLine::line_total).sum();
        let shipping = if self.lines.is_empty() {
            Decimal::ZERO
        } else {
            self.shipping.fee()
        };

        Totals {
            subtotal: Price::inr(subtotal),
            shipping: Price::inr(shipping),
            total: Price::inr(subtotal + shipping),
        }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Owned copy of the lines for building an order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    /// Product code to quantity map for the order payload.
    #[must_use]
    pub fn order_lines(&self) -> OrderLines {
        self.lines
            .iter()
            .map(|l| (l.id.clone(), l.quantity))
            .collect()
    }

    /// Total number of units, for the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.lines.iter().any(|l| &l.id == id)
    }

    /// Quantity of `id` in the cart, 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.lines
            .iter()
            .find(|l| &l.id == id)
            .map_or(0, |l| l.quantity)
    }

    fn commit(&mut self, next: Vec<CartLine>) -> Result<(), CartError> {
        let encoded = serde_json::to_string(&next).map_err(StorageError::from)?;
        self.storage.set(keys::CART_ITEMS, &encoded)?;
        self.lines = next;
        Ok(())
    }
}

fn normalize(stored: Vec<CartLine>) -> Vec<CartLine> {
    let mut lines: Vec<CartLine> = Vec::with_capacity(stored.len());
    for line in stored {
        if line.quantity == 0 {
            continue;
        }
        match lines.iter_mut().find(|l| l.id == line.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => lines.push(line),
        }
    }
    lines
}
