//! Reverse geocoding route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use eggbucket_core::Address;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Coordinates from the device.
#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub long: f64,
}

/// Draft an address from coordinates. Blank fields are left for the
/// customer to fill in.
#[instrument(skip(state))]
pub async fn reverse(
    State(state): State<AppState>,
    Query(query): Query<ReverseQuery>,
) -> Result<Json<Address>> {
    Ok(Json(state.geocoder().reverse(query.lat, query.long).await?))
}
