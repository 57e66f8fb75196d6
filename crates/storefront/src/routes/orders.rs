//! Order route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use eggbucket_core::{OrderOutcome, OrderRecord, Price};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireSession;
use crate::services::checkout;
use crate::state::AppState;

/// A past order for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub record: OrderRecord,
    pub number: String,
    pub amount_display: String,
}

impl From<OrderRecord> for OrderView {
    fn from(record: OrderRecord) -> Self {
        Self {
            number: record.display_number().to_string(),
            amount_display: Price::inr(record.amount).display(),
            record,
        }
    }
}

/// Order history, newest first.
#[instrument(skip_all, fields(phone = %session.phone))]
pub async fn index(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<Vec<OrderView>>> {
    let orders = state
        .backend()
        .orders_for_customer(&session.phone.customer_id())
        .await?;

    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// Place an order for the cart.
///
/// `201` when the order was placed; `422` when the backend declined it, with
/// the outcome explaining why. The cart is only cleared on `201`.
#[instrument(skip_all, fields(phone = %session.phone))]
pub async fn create(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<(StatusCode, Json<OrderOutcome>)> {
    let outcome = checkout::place_order(&state, &session).await?;

    let status = if outcome.is_placed() {
        StatusCode::CREATED
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    Ok((status, Json(outcome)))
}
