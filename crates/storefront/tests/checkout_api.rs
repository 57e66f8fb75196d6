//! Order placement and history endpoints.

#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use axum::Router;
use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use common::{CUSTOMER_ID, Stub, address, request};

async fn fill_cart(router: &Router) -> Result<(), String> {
    let (status, _) = request(
        router,
        Method::POST,
        "/api/cart/items",
        Some(json!({ "productId": "E6", "quantity": 2 })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

/// Save one address on the stub and select it.
async fn select_address(router: &Router) -> Result<(), String> {
    let (status, _) = request(
        router,
        Method::POST,
        "/api/account/addresses",
        Some(address("42")),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = request(
        router,
        Method::PUT,
        "/api/account/addresses/selected",
        Some(json!({ "index": 0 })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

async fn item_count(router: &Router) -> Result<Value, String> {
    let (_, count) = request(router, Method::GET, "/api/cart/count", None).await?;
    Ok(count["count"].clone())
}

#[tokio::test]
async fn placing_an_order_requires_sign_in() -> Result<(), String> {
    let stub = Stub::start().await;
    let (router, _) = stub.storefront();
    fill_cart(&router).await?;

    let (status, body) = request(&router, Method::POST, "/api/orders", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Please sign in to continue");
    assert_eq!(stub.state.placed_count(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_address_fails_validation_and_keeps_cart() -> Result<(), String> {
    let stub = Stub::start().await;
    let (router, _) = stub.signed_in_storefront();
    fill_cart(&router).await?;

    let (status, body) = request(&router, Method::POST, "/api/orders", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Please select an address before placing the order!"
    );
    assert_eq!(item_count(&router).await?, 2);
    assert_eq!(stub.state.placed_count(), 0);
    Ok(())
}

#[tokio::test]
async fn empty_cart_fails_validation() -> Result<(), String> {
    let stub = Stub::start().await;
    let (router, _) = stub.signed_in_storefront();
    select_address(&router).await?;

    let (status, body) = request(&router, Method::POST, "/api/orders", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Your cart is empty");
    assert_eq!(stub.state.placed_count(), 0);
    Ok(())
}

#[tokio::test]
async fn successful_order_clears_the_cart() -> Result<(), String> {
    let stub = Stub::start().await;
    let (router, _) = stub.signed_in_storefront();
    *stub.state.customer.lock().unwrap() = Some(json!({ "name": "Asha", "addresses": [] }));
    select_address(&router).await?;
    fill_cart(&router).await?;

    let (status, outcome) = request(&router, Method::POST, "/api/orders", None).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(outcome["outcome"], "placed");

    let placed = stub.state.placed.lock().unwrap().clone();
    assert_eq!(placed.len(), 1);
    let payload = &placed[0];
    assert_eq!(payload["amount"], 84.0);
    assert_eq!(payload["products"], json!({ "E6": 2 }));
    assert_eq!(payload["customerId"], CUSTOMER_ID);
    assert_eq!(payload["customerName"], "Asha");
    assert_eq!(payload["address"]["fullAddress"]["flatNo"], "42");

    assert_eq!(item_count(&router).await?, 0);
    Ok(())
}

#[tokio::test]
async fn uncovered_address_keeps_the_cart() -> Result<(), String> {
    let stub = Stub::start().await;
    let (router, _) = stub.signed_in_storefront();
    select_address(&router).await?;
    fill_cart(&router).await?;
    *stub.state.order_reply.lock().unwrap() = Some((
        StatusCode::BAD_REQUEST,
        json!({ "status": "error", "message": "Address is not serviceable by any outlet" }),
    ));

    let (status, outcome) = request(&router, Method::POST, "/api/orders", None).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(outcome["outcome"], "no_coverage");
    assert_eq!(
        outcome["message"],
        "Address is not serviceable by any outlet"
    );
    assert_eq!(item_count(&router).await?, 2);
    Ok(())
}

#[tokio::test]
async fn backend_failure_keeps_the_cart() -> Result<(), String> {
    let stub = Stub::start().await;
    let (router, _) = stub.signed_in_storefront();
    select_address(&router).await?;
    fill_cart(&router).await?;
    *stub.state.order_reply.lock().unwrap() =
        Some((StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "boom" })));

    let (status, outcome) = request(&router, Method::POST, "/api/orders", None).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(outcome["outcome"], "failed");
    assert_eq!(item_count(&router).await?, 2);

    // The guard was released; a retry goes through.
    *stub.state.order_reply.lock().unwrap() = None;
    let (status, _) = request(&router, Method::POST, "/api/orders", None).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item_count(&router).await?, 0);
    Ok(())
}

#[tokio::test]
async fn second_submission_while_in_flight_is_rejected() -> Result<(), String> {
    let stub = Stub::start().await;
    let (router, _) = stub.signed_in_storefront();
    select_address(&router).await?;
    fill_cart(&router).await?;
    *stub.state.order_delay.lock().unwrap() = Some(Duration::from_millis(300));

    let (first, second) = tokio::join!(
        request(&router, Method::POST, "/api/orders", None),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            request(&router, Method::POST, "/api/orders", None).await
        }
    );

    let (first_status, _) = first?;
    let (second_status, body) = second?;
    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "An order is already being placed");
    assert_eq!(stub.state.placed_count(), 1);
    Ok(())
}

#[tokio::test]
async fn items_added_during_submission_survive_the_order() -> Result<(), String> {
    let stub = Stub::start().await;
    let (router, _) = stub.signed_in_storefront();
    select_address(&router).await?;
    fill_cart(&router).await?;
    *stub.state.order_delay.lock().unwrap() = Some(Duration::from_millis(300));

    let (order, added) = tokio::join!(
        request(&router, Method::POST, "/api/orders", None),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            request(
                &router,
                Method::POST,
                "/api/cart/items",
                Some(json!({ "productId": "E30" })),
            )
            .await
        }
    );

    let (order_status, _) = order?;
    let (added_status, _) = added?;
    assert_eq!(order_status, StatusCode::CREATED);
    assert_eq!(added_status, StatusCode::OK);

    let placed = stub.state.placed.lock().unwrap().clone();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0]["products"], json!({ "E6": 2 }));

    let (_, cart) = request(&router, Method::GET, "/api/cart", None).await?;
    let items = cart["items"].as_array().cloned().unwrap_or_default();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "E30");
    assert_eq!(items[0]["quantity"], 1);
    Ok(())
}

#[tokio::test]
async fn order_history_is_newest_first() -> Result<(), String> {
    let stub = Stub::start().await;
    let (router, _) = stub.signed_in_storefront();
    *stub.state.orders.lock().unwrap() = vec![
        json!({ "id": "ORD-1001", "products": { "E6": 1 }, "amount": 42, "status": "delivered",
                "createdAt": "2026-01-02T10:00:00Z" }),
        json!({ "id": "ORD-1002", "products": { "E30": 1 }, "amount": "209", "status": "pending",
                "createdAt": "2026-03-04T10:00:00Z" }),
        json!({ "products": {}, "amount": 1 }),
    ];

    let (status, orders) = request(&router, Method::GET, "/api/orders", None).await?;
    assert_eq!(status, StatusCode::OK);

    let orders = orders.as_array().ok_or("expected a list")?;
    assert_eq!(orders.len(), 2, "record without id is skipped");
    assert_eq!(orders[0]["number"], "1002");
    assert_eq!(orders[0]["amountDisplay"], "₹209.00");
    assert_eq!(orders[1]["number"], "1001");
    Ok(())
}
