//! Catalog products.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product as shown in the catalog.
///
/// Built by the storefront's catalog client from the backend listing; the
/// backend's duck-typed fields are normalized before this type exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Pre-discount price, shown struck through. `None` when not discounted.
    pub original_price: Option<Price>,
    pub stock: u32,
    pub image: String,
}

impl Product {
    /// Whether the product can be added to the cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether the listing carries a discount.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.original_price
            .is_some_and(|original| original.amount > self.price.amount)
    }
}
