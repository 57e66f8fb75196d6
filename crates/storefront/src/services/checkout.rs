//! Order submission.

use eggbucket_core::{OrderOutcome, OrderPayload};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::session::Session;
use crate::state::AppState;

/// Submit the cart as an order for the signed-in customer.
///
/// Validation runs before anything is sent. Only one submission may be in
/// flight at a time. Only when the backend confirms the order are the ordered
/// quantities taken out of the cart; lines added while the request was out
/// stay. On any other outcome or a network failure the cart is left as it was.
///
/// # Errors
///
/// Returns `BadRequest` if no address is selected or the cart is empty,
/// `Conflict` if another submission is running, and `Backend` if the order
/// could not be sent.
#[instrument(skip_all, fields(customer_id = %session.phone.customer_id()))]
pub async fn place_order(state: &AppState, session: &Session) -> Result<OrderOutcome> {
    let Some(address) = state.sessions().selected_address()? else {
        return Err(AppError::BadRequest(
            "Please select an address before placing the order!".to_string(),
        ));
    };

    let Some(_guard) = state.begin_order() else {
        return Err(AppError::Conflict(
            "An order is already being placed".to_string(),
        ));
    };

    let (products, amount) = {
        let cart = state.cart()?;
        if cart.is_empty() {
            return Err(AppError::BadRequest("Your cart is empty".to_string()));
        }
        (cart.order_lines(), cart.totals().total.amount)
    };

    // The name is a nicety on the order; a missing profile is not a reason
    // to refuse it.
    let customer_name = match state.backend().customer(&session.phone).await {
        Ok(profile) => profile.and_then(|p| p.display_name().map(str::to_string)),
        Err(e) => {
            tracing::warn!(error = %e, "Could not load customer name for order");
            None
        }
    };

    let payload = OrderPayload {
        address,
        amount,
        products: products.clone(),
        customer_id: session.phone.customer_id(),
        customer_name,
    };

    let outcome = state.backend().place_order(&payload).await?;

    if outcome.is_placed() {
        add_breadcrumb("checkout", "Order placed", None);
        // Stock moved.
        state.backend().invalidate_catalog().await;
        match state.cart() {
            Ok(mut cart) => {
                if let Err(e) = cart.remove_ordered(&products) {
                    tracing::error!(error = %e, "Order placed but ordered lines could not be removed from the cart");
                }
            }
            Err(e) => tracing::error!(error = %e, "Order placed but cart lock is poisoned"),
        }
    } else {
        add_breadcrumb("checkout", outcome.message(), None);
    }

    Ok(outcome)
}
