//! `eb-cli session` commands.

use std::path::Path;

use eggbucket_storefront::session::SessionStore;
use tracing::info;

use super::{CommandError, open_storage};

/// Print who is signed in and where orders will be delivered.
///
/// # Errors
///
/// Returns an error if storage cannot be read.
pub fn show(data_dir: &Path) -> Result<(), CommandError> {
    let sessions = SessionStore::new(open_storage(data_dir)?);

    match sessions.load()? {
        Some(session) => info!(phone = %session.phone, "Signed in"),
        None => info!("Signed out"),
    }

    match sessions.selected_address()? {
        Some(address) => info!(address = %address, "Delivery address"),
        None => info!("No delivery address selected"),
    }
    Ok(())
}

/// Sign out. The cart is kept.
///
/// # Errors
///
/// Returns an error if storage cannot be written.
pub fn logout(data_dir: &Path) -> Result<(), CommandError> {
    SessionStore::new(open_storage(data_dir)?).clear()?;
    info!("Signed out");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eggbucket_core::storage::keys;

    use super::*;

    #[test]
    fn test_logout_keeps_cart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = open_storage(dir.path()).unwrap();
            storage.set(keys::TOKEN, "token").unwrap();
            storage.set(keys::PHONE_NUMBER, "+919876543210").unwrap();
            storage.set(keys::CART_ITEMS, "[]").unwrap();
        }

        logout(dir.path()).unwrap();

        let storage = open_storage(dir.path()).unwrap();
        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
        assert_eq!(storage.get(keys::PHONE_NUMBER).unwrap(), None);
        assert_eq!(storage.get(keys::CART_ITEMS).unwrap().as_deref(), Some("[]"));
    }
}
