//! Cart route handlers.
//!
//! Every mutation goes through the [`CartStore`](eggbucket_core::CartStore),
//! which persists before it changes memory, and answers with the whole cart.

use axum::{
    Json,
    extract::{Path, State},
};
use eggbucket_core::{CartLine, CartStore, Price, ProductId, RawProductId, Totals};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// One cart line for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price: Price,
    pub line_total: Price,
    pub price_display: String,
    pub line_total_display: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        let price = Price::inr(line.price);
        let line_total = Price::inr(line.line_total());
        Self {
            id: line.id.clone(),
            name: line.name.clone(),
            image: line.image.clone(),
            quantity: line.quantity,
            price_display: price.display(),
            line_total_display: line_total.display(),
            price,
            line_total,
        }
    }
}

/// The cart with derived totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
    pub totals: Totals,
    pub subtotal_display: String,
    /// "Free" when no shipping is charged.
    pub shipping_display: String,
    pub total_display: String,
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        let totals = cart.totals();
        let shipping_display = if totals.shipping.amount.is_zero() {
            "Free".to_string()
        } else {
            totals.shipping.display()
        };

        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            item_count: cart.item_count(),
            subtotal_display: totals.subtotal.display(),
            total_display: totals.total.display(),
            shipping_display,
            totals,
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: RawProductId,
    pub quantity: Option<u32>,
}

fn product_id(raw: String) -> ProductId {
    ProductId::from(RawProductId::Code(raw))
}

/// Show the cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<CartView>> {
    let cart = state.cart()?;
    Ok(Json(CartView::from(&*cart)))
}

/// Number of units in the cart, for the badge.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<Json<Value>> {
    let count = state.cart()?.item_count();
    Ok(Json(json!({ "count": count })))
}

/// Add a catalog product to the cart.
///
/// The product is looked up in the catalog first so the line carries
/// current name, price and image.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let id = ProductId::from(request.product_id);
    let quantity = request.quantity.unwrap_or(1);

    let product = state.backend().product(&id).await?;
    if !product.in_stock() {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock",
            product.name
        )));
    }

    let mut cart = state.cart()?;
    let now = cart.add_quantity(&product, quantity)?;
    tracing::debug!(product_id = %id, quantity = now, "Added to cart");
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));

    Ok(Json(CartView::from(&*cart)))
}

/// Add one more of a product already in the cart.
#[instrument(skip(state))]
pub async fn increment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CartView>> {
    let id = product_id(id);
    let mut cart = state.cart()?;

    if cart.increment(&id)?.is_none() {
        return Err(AppError::NotFound(format!("{id} is not in the cart")));
    }

    Ok(Json(CartView::from(&*cart)))
}

/// Take one away; the line disappears at zero.
#[instrument(skip(state))]
pub async fn decrement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CartView>> {
    let id = product_id(id);
    let mut cart = state.cart()?;
    cart.decrement(&id)?;
    Ok(Json(CartView::from(&*cart)))
}

/// Remove a line entirely.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CartView>> {
    let id = product_id(id);
    let mut cart = state.cart()?;
    if cart.remove(&id)? {
        add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", id.as_str())]));
    }
    Ok(Json(CartView::from(&*cart)))
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<Json<CartView>> {
    let mut cart = state.cart()?;
    cart.clear()?;
    Ok(Json(CartView::from(&*cart)))
}
