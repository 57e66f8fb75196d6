//! `eb-cli cart` commands.

use std::path::Path;
use std::sync::Arc;

use eggbucket_core::{CartError, CartStore, LocalStorage, Price, ShippingPolicy};
use eggbucket_storefront::config::shipping_fee_from_env;
use tracing::info;

use super::{CommandError, open_storage};

fn shipping_from_env() -> Result<ShippingPolicy, CommandError> {
    Ok(ShippingPolicy::from_fee(shipping_fee_from_env()?))
}

fn open_cart(storage: Arc<dyn LocalStorage>) -> Result<CartStore, CommandError> {
    Ok(CartStore::open(storage, shipping_from_env()?)?)
}

/// Print the stored cart.
///
/// # Errors
///
/// Returns an error if storage cannot be read or the cart is corrupt.
pub fn show(data_dir: &Path) -> Result<(), CommandError> {
    let cart = open_cart(open_storage(data_dir)?)?;

    if cart.is_empty() {
        info!("Cart is empty");
        return Ok(());
    }

    for line in cart.lines() {
        info!(
            id = %line.id,
            quantity = line.quantity,
            unit = %Price::inr(line.price),
            total = %Price::inr(line.line_total()),
            "{}",
            line.name
        );
    }

    let totals = cart.totals();
    info!(
        items = cart.item_count(),
        subtotal = %totals.subtotal,
        shipping = %totals.shipping,
        total = %totals.total,
        "Cart totals"
    );
    Ok(())
}

/// Empty the stored cart. A corrupt cart is overwritten.
///
/// # Errors
///
/// Returns an error if storage cannot be written.
pub fn clear(data_dir: &Path) -> Result<(), CommandError> {
    let storage = open_storage(data_dir)?;
    let mut cart = match open_cart(Arc::clone(&storage)) {
        Ok(cart) => cart,
        Err(CommandError::Cart(CartError::Corrupt(e))) => {
            tracing::warn!(error = %e, "Stored cart unreadable, overwriting");
            CartStore::empty(storage, ShippingPolicy::Free)
        }
        Err(e) => return Err(e),
    };

    let removed = cart.item_count();
    cart.clear()?;
    info!(removed, "Cart cleared");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eggbucket_core::storage::keys;

    use super::*;

    #[test]
    fn test_clear_overwrites_corrupt_cart() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open_storage(dir.path()).unwrap();
        storage.set(keys::CART_ITEMS, "not a cart").unwrap();
        drop(storage);

        assert!(show(dir.path()).is_err());
        clear(dir.path()).unwrap();
        show(dir.path()).unwrap();

        let storage = open_storage(dir.path()).unwrap();
        assert_eq!(storage.get(keys::CART_ITEMS).unwrap().as_deref(), Some("[]"));
    }
}
