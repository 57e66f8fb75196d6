//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Health check
//!
//! # Catalog
//! GET    /api/products                    - Product listing with cart quantities
//!
//! # Cart
//! GET    /api/cart                        - Cart with totals
//! GET    /api/cart/count                  - Units in cart (badge)
//! POST   /api/cart/items                  - Add {productId, quantity?}
//! POST   /api/cart/items/{id}/increment   - One more
//! POST   /api/cart/items/{id}/decrement   - One fewer (removes at zero)
//! DELETE /api/cart/items/{id}             - Remove line
//! DELETE /api/cart                        - Empty cart
//!
//! # Auth
//! POST   /api/auth/otp/send               - Text a code {phone}
//! POST   /api/auth/otp/verify             - Sign in {code}
//! GET    /api/auth/session                - Sign-in state
//! POST   /api/auth/logout                 - Sign out (cart kept)
//!
//! # Account (requires sign-in)
//! GET    /api/account/profile             - Profile
//! PATCH  /api/account/profile             - Update profile
//! GET    /api/account/addresses           - Saved addresses
//! POST   /api/account/addresses           - Add address
//! PUT    /api/account/addresses/{index}   - Edit address
//! DELETE /api/account/addresses/{index}   - Delete address
//! GET    /api/account/addresses/selected  - Delivery address
//! PUT    /api/account/addresses/selected  - Choose delivery address {index}
//!
//! # Location
//! GET    /api/geocode/reverse?lat=&long=  - Address draft from coordinates
//!
//! # Orders (requires sign-in)
//! GET    /api/orders                      - Order history
//! POST   /api/orders                      - Place order for the cart
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod geocode;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add))
        .route("/items/{id}", axum::routing::delete(cart::remove))
        .route("/items/{id}/increment", post(cart::increment))
        .route("/items/{id}/decrement", post(cart::decrement))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/otp/send", post(auth::send_code))
        .route("/otp/verify", post(auth::verify_code))
        .route("/session", get(auth::session))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::profile).patch(account::update_profile),
        )
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/selected",
            get(account::selected_address).put(account::select_address),
        )
        .route(
            "/addresses/{index}",
            put(account::update_address).delete(account::delete_address),
        )
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::index))
        .nest("/api/cart", cart_routes())
        .nest("/api/auth", auth_routes())
        .nest("/api/account", account_routes())
        .route("/api/geocode/reverse", get(geocode::reverse))
        .route("/api/orders", get(orders::index).post(orders::create))
}
