//! Error types for upload URL issuance

use thiserror::Error;
use upload_storage::{DescriptorError, KeyError, SigningError};

/// Result type for issuance operations
pub type IssuanceResult<T> = Result<T, IssuanceError>;

/// Errors that can occur while issuing a presigned URL
#[derive(Error, Debug)]
pub enum IssuanceError {
    /// Missing or malformed client input; nothing was derived or signed
    #[error("Invalid request: {0}")]
    InvalidRequest(&'static str),

    /// Key derivation rejected a server-chosen segment
    #[error("Failed to derive object key: {0}")]
    Key(#[from] KeyError),

    /// Operation descriptor could not be built
    #[error("Invalid storage operation: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Signature computation failed
    #[error("Failed to sign storage request: {0}")]
    Signing(#[from] SigningError),
}
