//! Command implementations.

pub mod cart;
pub mod catalog;
pub mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use eggbucket_core::{CartError, LocalStorage, StorageError};
use eggbucket_storefront::backend::BackendError;
use eggbucket_storefront::config::ConfigError;
use eggbucket_storefront::storage::FileStorage;

/// Errors a command can end with.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// `STOREFRONT_DATA_DIR`, or `.eggbucket` in the working directory.
pub fn default_data_dir() -> PathBuf {
    std::env::var("STOREFRONT_DATA_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| PathBuf::from(".eggbucket"), PathBuf::from)
}

fn open_storage(data_dir: &Path) -> Result<Arc<dyn LocalStorage>, CommandError> {
    tracing::debug!(data_dir = %data_dir.display(), "Opening local storage");
    Ok(Arc::new(FileStorage::open(data_dir)?))
}
