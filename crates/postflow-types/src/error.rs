//! Shared error types used by the store port and its implementations.

use thiserror::Error;

/// Errors from custom-workflow store operations (trait defined in
/// postflow-core, implemented in postflow-infra).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}
