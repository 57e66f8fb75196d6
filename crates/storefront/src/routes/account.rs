//! Account route handlers: profile and address book.
//!
//! All handlers require a signed-in customer. The backend stores the
//! address list; the selected delivery address is a local snapshot.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use eggbucket_core::{Address, CustomerProfile, ProfileUpdate};
use serde::Deserialize;
use tracing::instrument;

use crate::backend::types::CustomerPatch;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireSession;
use crate::session::Session;
use crate::state::AppState;

/// Select address request body.
#[derive(Debug, Deserialize)]
pub struct SelectAddressRequest {
    pub index: usize,
}

/// Customer document, or a blank profile for a customer without one.
async fn load_profile(state: &AppState, session: &Session) -> Result<CustomerProfile> {
    Ok(state
        .backend()
        .customer(&session.phone)
        .await?
        .unwrap_or_else(|| CustomerProfile::with_phone(session.phone.e164())))
}

async fn address_at(state: &AppState, session: &Session, index: usize) -> Result<Address> {
    load_profile(state, session)
        .await?
        .addresses
        .into_iter()
        .nth(index)
        .ok_or_else(|| AppError::NotFound(format!("No address at position {index}")))
}

/// Show the profile.
#[instrument(skip_all, fields(phone = %session.phone))]
pub async fn profile(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<CustomerProfile>> {
    Ok(Json(load_profile(&state, &session).await?))
}

/// Update name, email, age and gender.
#[instrument(skip_all, fields(phone = %session.phone))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<CustomerProfile>> {
    let update = update.validated()?;

    let patch = CustomerPatch {
        name: Some(update.name),
        email: Some(update.email),
        age: Some(update.age),
        gender: update.gender,
        ..CustomerPatch::default()
    };
    state.backend().patch_customer(&session.phone, &patch).await?;
    add_breadcrumb("account", "Profile updated", None);

    Ok(Json(load_profile(&state, &session).await?))
}

/// List saved addresses.
#[instrument(skip_all, fields(phone = %session.phone))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<Vec<Address>>> {
    Ok(Json(load_profile(&state, &session).await?.addresses))
}

/// Save a new address.
#[instrument(skip_all, fields(phone = %session.phone))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Json(address): Json<Address>,
) -> Result<(StatusCode, Json<Vec<Address>>)> {
    let address = address.validated()?;

    state
        .backend()
        .patch_customer(&session.phone, &CustomerPatch::add_address(address))
        .await?;
    add_breadcrumb("account", "Address added", None);

    let addresses = load_profile(&state, &session).await?.addresses;
    Ok((StatusCode::CREATED, Json(addresses)))
}

/// Replace the address at `index`. A selected address follows the edit.
#[instrument(skip_all, fields(phone = %session.phone, index = index))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(index): Path<usize>,
    Json(address): Json<Address>,
) -> Result<Json<Vec<Address>>> {
    let address = address.validated()?;
    let previous = address_at(&state, &session, index).await?;

    state
        .backend()
        .patch_customer(
            &session.phone,
            &CustomerPatch::replace_address(index, address.clone()),
        )
        .await?;

    let sessions = state.sessions();
    if sessions.selected_address()?.as_ref() == Some(&previous) {
        sessions.select_address(&address)?;
    }

    Ok(Json(load_profile(&state, &session).await?.addresses))
}

/// Delete the address at `index`. Deleting the selected address clears the
/// selection.
#[instrument(skip_all, fields(phone = %session.phone, index = index))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(index): Path<usize>,
) -> Result<Json<Vec<Address>>> {
    let removed = address_at(&state, &session, index).await?;

    state
        .backend()
        .patch_customer(&session.phone, &CustomerPatch::remove_address(index))
        .await?;

    let sessions = state.sessions();
    if sessions.selected_address()?.as_ref() == Some(&removed) {
        sessions.clear_selected_address()?;
        tracing::debug!("Deleted address was selected, selection cleared");
    }

    Ok(Json(load_profile(&state, &session).await?.addresses))
}

/// The address the next order will be delivered to.
#[instrument(skip_all)]
pub async fn selected_address(
    State(state): State<AppState>,
    RequireSession(_session): RequireSession,
) -> Result<Json<Option<Address>>> {
    Ok(Json(state.sessions().selected_address()?))
}

/// Choose a saved address for delivery.
#[instrument(skip_all, fields(phone = %session.phone, index = request.index))]
pub async fn select_address(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Json(request): Json<SelectAddressRequest>,
) -> Result<Json<Address>> {
    let address = address_at(&state, &session, request.index).await?;
    state.sessions().select_address(&address)?;
    add_breadcrumb("account", "Delivery address selected", None);

    Ok(Json(address))
}
