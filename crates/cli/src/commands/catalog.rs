//! `eb-cli catalog` commands.

use eggbucket_storefront::backend::BackendClient;
use eggbucket_storefront::config::BackendConfig;
use tracing::info;

use super::CommandError;

/// Print the backend catalog, normalized the way the storefront sees it.
///
/// # Errors
///
/// Returns an error if `STOREFRONT_BACKEND_URL` is unset or the backend
/// cannot be reached.
pub async fn list() -> Result<(), CommandError> {
    let backend = BackendClient::new(&BackendConfig::from_env()?);
    let products = backend.products().await?;

    for product in &products {
        info!(
            id = %product.id,
            price = %product.price,
            original = ?product.original_price.map(|p| p.display()),
            stock = product.stock,
            "{}",
            product.name
        );
    }
    info!(count = products.len(), "Catalog listed");
    Ok(())
}
