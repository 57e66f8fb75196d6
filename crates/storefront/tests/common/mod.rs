//! Shared fixtures: an in-process stand-in for the backend, auth provider
//! and geocoder, plus request helpers for the storefront router.

#![allow(dead_code, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{Method, Request, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use eggbucket_core::storage::keys;
use eggbucket_core::{LocalStorage, MemoryStorage};
use eggbucket_storefront::config::{AuthConfig, BackendConfig, GeocoderConfig, StorefrontConfig};
use eggbucket_storefront::state::AppState;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;

pub const PHONE: &str = "+919876543210";
pub const CUSTOMER_ID: &str = "919876543210";
pub const VALID_CODE: &str = "123456";

/// What the stub has been asked and how it should answer.
#[derive(Default)]
pub struct StubState {
    /// Reply to `POST /order/place`; `None` means success.
    pub order_reply: Mutex<Option<(StatusCode, Value)>>,
    pub order_delay: Mutex<Option<Duration>>,
    pub placed: Mutex<Vec<Value>>,
    /// Customer document; `None` answers 404.
    pub customer: Mutex<Option<Value>>,
    pub patches: Mutex<Vec<Value>>,
    pub orders: Mutex<Vec<Value>>,
    pub product_fetches: AtomicUsize,
}

impl StubState {
    pub fn placed_count(&self) -> usize {
        self.placed.lock().unwrap().len()
    }
}

pub struct Stub {
    pub addr: SocketAddr,
    pub state: Arc<StubState>,
}

impl Stub {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());

        let router = Router::new()
            .route("/api/v1/products", get(products))
            .route("/api/v1/order/place", post(place_order))
            .route("/api/v1/order/customer", get(customer_orders))
            .route(
                "/api/v1/customer/user/{key}",
                get(get_customer).patch(patch_customer),
            )
            .route("/v1/accounts:sendVerificationCode", post(send_code))
            .route("/v1/accounts:signInWithPhoneNumber", post(sign_in))
            .route("/reverse", get(reverse))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).unwrap()
    }

    pub fn config(&self, data_dir: PathBuf) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            data_dir,
            allowed_origin: None,
            shipping_fee: Decimal::ZERO,
            backend: BackendConfig {
                base_url: self.url("/"),
                catalog_ttl: Duration::from_secs(300),
            },
            auth: AuthConfig {
                base_url: self.url("/v1"),
                api_key: SecretString::from("stub-api-key"),
                challenge_ttl: Duration::from_secs(300),
            },
            geocoder: GeocoderConfig {
                base_url: self.url("/"),
            },
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Storefront on in-memory storage.
    pub fn storefront(&self) -> (Router, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::with_storage(self.config(PathBuf::from("unused")), storage.clone())
            .unwrap();
        (eggbucket_storefront::app(state), storage)
    }

    /// Storefront with a customer already signed in.
    pub fn signed_in_storefront(&self) -> (Router, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::TOKEN, "stub-token").unwrap();
        storage.set(keys::PHONE_NUMBER, PHONE).unwrap();
        let state = AppState::with_storage(self.config(PathBuf::from("unused")), storage.clone())
            .unwrap();
        (eggbucket_storefront::app(state), storage)
    }
}

pub fn address(flat: &str) -> Value {
    json!({
        "fullAddress": {
            "flatNo": flat,
            "area": "Koramangala",
            "city": "Bengaluru",
            "state": "Karnataka",
            "zipCode": "560034",
            "country": "India"
        },
        "coordinates": { "lat": 12.93, "long": 77.62 }
    })
}

pub async fn request(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value), String> {
    let builder = Request::builder().method(method).uri(uri);

    let req = if let Some(payload) = body {
        let bytes =
            serde_json::to_vec(&payload).map_err(|err| format!("serialize request body: {err}"))?;
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .map_err(|err| format!("build request: {err}"))?
    } else {
        builder
            .body(Body::empty())
            .map_err(|err| format!("build request: {err}"))?
    };

    let response = router
        .clone()
        .oneshot(req)
        .await
        .map_err(|err| format!("route request: {err}"))?;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .map_err(|err| format!("read response body: {err}"))?;

    let parsed = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(
            String::from_utf8_lossy(&body).into_owned(),
        ))
    };
    Ok((status, parsed))
}

// =============================================================================
// Stub handlers
// =============================================================================

async fn products(State(state): State<Arc<StubState>>) -> Json<Value> {
    state.product_fetches.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "products": [
            { "id": "E6", "name": "6 Eggs", "price": 42, "discount": 8, "stock": 25 },
            { "id": 1, "name": "30 Eggs", "price": "209", "totalStock": 4, "imageUrl": "" },
            { "id": "E12", "name": "12 Eggs", "price": 80, "stock": 0 }
        ]
    }))
}

async fn place_order(
    State(state): State<Arc<StubState>>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let delay = *state.order_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    state.placed.lock().unwrap().push(payload);
    let reply = state.order_reply.lock().unwrap().clone();
    reply.map_or_else(
        || {
            (
                StatusCode::OK,
                Json(json!({ "status": "success", "message": "Order placed successfully" })),
            )
        },
        |(status, body)| (status, Json(body)),
    )
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrdersQuery {
    customer_id: String,
}

async fn customer_orders(
    State(state): State<Arc<StubState>>,
    Query(query): Query<OrdersQuery>,
) -> impl IntoResponse {
    if query.customer_id != CUSTOMER_ID {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "no orders" })));
    }
    let orders = state.orders.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({ "orders": orders })))
}

async fn get_customer(
    State(state): State<Arc<StubState>>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    assert_eq!(key, "9876543210", "customer documents are keyed by national number");
    state.customer.lock().unwrap().clone().map_or_else(
        || (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))),
        |doc| (StatusCode::OK, Json(json!({ "data": doc }))),
    )
}

async fn patch_customer(
    State(state): State<Arc<StubState>>,
    Json(patch): Json<Value>,
) -> Json<Value> {
    state.patches.lock().unwrap().push(patch.clone());

    let mut guard = state.customer.lock().unwrap();
    let doc = guard.get_or_insert_with(|| json!({ "addresses": [] }));

    let mut addresses: Vec<Value> = doc["addresses"].as_array().cloned().unwrap_or_default();
    if let Some(index) = patch.get("removeAddr").and_then(Value::as_u64) {
        let index = usize::try_from(index).unwrap();
        if index < addresses.len() {
            addresses.remove(index);
        }
    }
    if let Some(new) = patch.get("addresses").and_then(Value::as_array) {
        addresses.extend(new.iter().cloned());
    }
    doc["addresses"] = Value::Array(addresses);

    for field in ["phoneNumber", "name", "email", "age", "gender"] {
        if let Some(value) = patch.get(field) {
            doc[field] = value.clone();
        }
    }

    Json(json!({ "status": "success" }))
}

async fn send_code(Json(body): Json<Value>) -> impl IntoResponse {
    if body["phoneNumber"] == PHONE {
        (StatusCode::OK, Json(json!({ "sessionInfo": "stub-session-info" })))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "code": 400, "message": "INVALID_PHONE_NUMBER" } })),
        )
    }
}

async fn sign_in(Json(body): Json<Value>) -> impl IntoResponse {
    if body["sessionInfo"] != "stub-session-info" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "code": 400, "message": "INVALID_SESSION_INFO" } })),
        );
    }
    if body["code"] != VALID_CODE {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "code": 400, "message": "INVALID_CODE" } })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "idToken": "id-token-from-stub", "phoneNumber": PHONE })),
    )
}

#[derive(serde::Deserialize)]
struct ReverseQuery {
    lat: f64,
    lon: f64,
}

async fn reverse(Query(query): Query<ReverseQuery>) -> Json<Value> {
    if query.lat == 0.0 && query.lon == 0.0 {
        return Json(json!({ "error": "Unable to geocode" }));
    }
    Json(json!({
        "display_name": "80 Feet Road, Koramangala, Bengaluru",
        "address": {
            "road": "80 Feet Road",
            "suburb": "Koramangala",
            "city": "Bengaluru",
            "state": "Karnataka",
            "postcode": "560034",
            "country": "India"
        }
    }))
}
