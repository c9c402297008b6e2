//! Custom error types for the backup core.

use thiserror::Error;

use crate::store::StoreError;
use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BackupError>;
