//! Wire types for the backend REST API and their conversion into core types.
//!
//! The backend's JSON is loosely shaped: ids may be numbers or codes, prices
//! numbers or strings, and list endpoints sometimes wrap their payload.
//! Everything is normalized here before it reaches the rest of the crate.

use eggbucket_core::{
    Address, CustomerProfile, Gender, Price, Product, ProductId, RawProductId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as listed by `GET /api/v1/products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(alias = "productId", alias = "_id")]
    pub id: RawProductId,
    #[serde(default)]
    pub name: Option<String>,
    pub price: Decimal,
    /// Rupees off the original price.
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default, alias = "totalStock", alias = "quantity")]
    pub stock: Option<i64>,
    #[serde(default, alias = "imageUrl")]
    pub image: Option<String>,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        let id = ProductId::from(raw.id);
        let original_price = raw
            .discount
            .filter(|d| *d > Decimal::ZERO)
            .map(|d| Price::inr(raw.price + d));
        let image = raw
            .image
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| id.default_image().to_owned());
        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.to_string());

        Self {
            name,
            price: Price::inr(raw.price),
            original_price,
            stock: raw
                .stock
                .map_or(0, |s| u32::try_from(s.max(0)).unwrap_or(u32::MAX)),
            image,
            id,
        }
    }
}

/// List endpoints return either a bare array or an object wrapping it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Products { products: Vec<T> },
    Orders { orders: Vec<T> },
    Data { data: Vec<T> },
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items)
            | Self::Products { products: items }
            | Self::Orders { orders: items }
            | Self::Data { data: items } => items,
        }
    }
}

/// Reply of `POST /api/v1/order/place`.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceOrderResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

/// Customer document reply, either bare or wrapped in `data`/`user`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CustomerResponse {
    Wrapped {
        #[serde(alias = "user")]
        data: CustomerProfile,
    },
    Bare(CustomerProfile),
}

impl From<CustomerResponse> for CustomerProfile {
    fn from(response: CustomerResponse) -> Self {
        match response {
            CustomerResponse::Wrapped { data } | CustomerResponse::Bare(data) => data,
        }
    }
}

/// Body of `PATCH /api/v1/customer/user/{documentKey}`.
///
/// Only the set fields are sent. `addresses` entries are appended by the
/// backend; `remove_addr` deletes the entry at that index first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_addr: Option<usize>,
}

impl CustomerPatch {
    /// Record the phone number on a (possibly new) customer document.
    #[must_use]
    pub fn phone(phone_number: String) -> Self {
        Self {
            phone_number: Some(phone_number),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn add_address(address: Address) -> Self {
        Self {
            addresses: Some(vec![address]),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn replace_address(index: usize, address: Address) -> Self {
        Self {
            addresses: Some(vec![address]),
            remove_addr: Some(index),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn remove_address(index: usize) -> Self {
        Self {
            remove_addr: Some(index),
            ..Self::default()
        }
    }
}
