use thiserror::Error;

use pantry_core::ValidationError;
use pantry_store::StoreError;

/// Errors returned by [`PantryService`](crate::PantryService) operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller supplied incomplete or malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced item, or any item for a dashboard, does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The service was misconfigured (e.g. missing required components).
    #[error("configuration error: {0}")]
    Configuration(String),
}
