//! Catalog route handlers.

use axum::{Json, extract::State};
use eggbucket_core::Product;
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// A catalog entry with the quantity already in the cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub price_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price_display: Option<String>,
    pub in_stock: bool,
    pub in_cart: u32,
}

/// List the catalog.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductView>>> {
    let products = state.backend().products().await?;

    let cart = state.cart()?;
    let views = products
        .into_iter()
        .map(|product| ProductView {
            price_display: product.price.display(),
            original_price_display: product
                .is_discounted()
                .then(|| product.original_price.map(|p| p.display()))
                .flatten(),
            in_stock: product.in_stock(),
            in_cart: cart.quantity_of(&product.id),
            product,
        })
        .collect();

    Ok(Json(views))
}
