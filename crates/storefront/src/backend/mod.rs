//! Client for the EggBucket backend REST API.
//!
//! # Endpoints
//!
//! ```text
//! GET   /api/v1/products                        - Catalog
//! POST  /api/v1/order/place                     - Place an order
//! GET   /api/v1/order/customer?customerId=      - Order history
//! GET   /api/v1/customer/user/{documentKey}     - Customer document
//! PATCH /api/v1/customer/user/{documentKey}     - Update customer document
//! ```
//!
//! The product list is cached in memory via `moka` (default 5 minute TTL).

mod cache;
pub mod types;

use std::sync::Arc;

use eggbucket_core::{
    CustomerProfile, OrderOutcome, OrderPayload, OrderRecord, PhoneNumber, Product, ProductId,
};
use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;

use cache::{CacheKey, CacheValue};
use types::{CustomerPatch, CustomerResponse, ListResponse, PlaceOrderResponse, RawProduct};

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

const BODY_LOG_LIMIT: usize = 500;

fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

/// Client for the backend REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.catalog_ttl)
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/v1/{path}"))?)
    }

    /// Read a response body, turning rate limits and error statuses into
    /// errors.
    async fn read_body(response: reqwest::Response) -> Result<String, BackendError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(truncate(&body, 200)));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&body, BODY_LOG_LIMIT),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        Ok(body)
    }

    fn parse<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
        serde_json::from_str(body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(body, BODY_LOG_LIMIT),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get the product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let response = self
            .inner
            .client
            .get(self.endpoint("products")?)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        let raw: ListResponse<RawProduct> = Self::parse(&body)?;

        let products: Vec<Product> = raw.into_vec().into_iter().map(Product::from).collect();
        debug!(count = products.len(), "Fetched products");

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Look up one product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product has this id, or an error if the
    /// catalog cannot be fetched.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, BackendError> {
        self.products()
            .await?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("Product not found: {id}")))
    }

    /// Drop the cached catalog.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate(&CacheKey::Products).await;
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order and classify the reply.
    ///
    /// Error statuses are not errors here: the backend reports coverage and
    /// validation failures through them, so they become an [`OrderOutcome`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the request could not be sent or the reply
    /// could not be read.
    #[instrument(skip(self, payload), fields(customer_id = %payload.customer_id, amount = %payload.amount))]
    pub async fn place_order(&self, payload: &OrderPayload) -> Result<OrderOutcome, BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("order/place")?)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let reply: PlaceOrderResponse = serde_json::from_str(&body).unwrap_or_else(|_| {
            PlaceOrderResponse {
                status: None,
                message: Some(truncate(&body, 200)).filter(|m| !m.trim().is_empty()),
            }
        });

        let outcome = OrderOutcome::classify(
            status.is_success(),
            reply.status.as_deref(),
            reply.message.as_deref(),
        );

        if outcome.is_placed() {
            tracing::info!(status = %status, "Order placed");
        } else {
            tracing::warn!(
                status = %status,
                body = %truncate(&body, BODY_LOG_LIMIT),
                outcome = ?outcome,
                "Order was not placed"
            );
        }

        Ok(outcome)
    }

    /// Orders placed by `customer_id`, newest first. A customer without
    /// orders gets an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn orders_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<OrderRecord>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("order/customer")?)
            .query(&[("customerId", customer_id)])
            .send()
            .await?;

        let body = match Self::read_body(response).await {
            Ok(body) => body,
            Err(BackendError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let raw: ListResponse<serde_json::Value> = Self::parse(&body)?;
        let mut records: Vec<OrderRecord> = raw
            .into_vec()
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed order record");
                    None
                }
            })
            .collect();

        OrderRecord::sort_newest_first(&mut records);
        Ok(records)
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Fetch the customer document. `None` when the customer has none yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(phone = %phone))]
    pub async fn customer(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<CustomerProfile>, BackendError> {
        let url = self.endpoint(&format!("customer/user/{}", phone.document_key()))?;
        let response = self.inner.client.get(url).send().await?;

        let body = match Self::read_body(response).await {
            Ok(body) => body,
            Err(BackendError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }

        let response: CustomerResponse = Self::parse(&body)?;
        Ok(Some(response.into()))
    }

    /// Apply a partial update to the customer document.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, patch), fields(phone = %phone))]
    pub async fn patch_customer(
        &self,
        phone: &PhoneNumber,
        patch: &CustomerPatch,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("customer/user/{}", phone.document_key()))?;
        let response = self.inner.client.patch(url).json(patch).send().await?;
        Self::read_body(response).await?;
        Ok(())
    }
}
