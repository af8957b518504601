//! Error types for upload storage operations

use thiserror::Error;

/// Result type for signing operations
pub type SigningResult<T> = Result<T, SigningError>;

/// Errors raised while building a storage configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StorageConfigError {
    /// A required field was empty
    #[error("Missing required storage setting: {0}")]
    MissingField(&'static str),

    /// The bucket name cannot be used in a virtual-hosted address
    #[error("Invalid bucket name: {0}")]
    InvalidBucket(String),

    /// The endpoint URL could not be parsed or has no host
    #[error("Invalid storage endpoint: {0}")]
    InvalidEndpoint(String),

    /// The expiry policy is outside the SigV4 limits
    #[error("Invalid presigned URL expiry: {0}")]
    InvalidExpiry(String),
}

/// Errors raised while deriving an object key
#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyError {
    /// An entity id contains characters outside `[A-Za-z0-9_-]`
    #[error("Invalid entity id: {0:?}")]
    InvalidEntityId(String),

    /// A subpath segment contains characters outside `[A-Za-z0-9_-]`
    #[error("Invalid key subpath: {0:?}")]
    InvalidSubpath(String),

    /// The id source produced something that is not a single key segment
    #[error("Invalid generated id: {0:?}")]
    InvalidGeneratedId(String),
}

/// Errors raised while constructing an operation descriptor
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DescriptorError {
    /// Bucket name was empty
    #[error("Bucket must not be empty")]
    EmptyBucket,

    /// Object key was empty
    #[error("Object key must not be empty")]
    EmptyKey,

    /// Content type was empty
    #[error("Content type must not be empty")]
    EmptyContentType,

    /// Object key has an absolute, empty, or relative segment
    #[error("Invalid object key: {0:?}")]
    InvalidKey(String),

    /// Header value contains characters that cannot be sent in a header
    #[error("Invalid value for header {0}")]
    InvalidHeaderValue(&'static str),
}

/// Errors raised while signing a request
#[derive(Error, Debug)]
pub enum SigningError {
    /// HMAC key setup failed
    #[error("Failed to initialise HMAC: {0}")]
    Hmac(#[from] hmac::digest::InvalidLength),

    /// The computed expiry does not fit in a timestamp
    #[error("Expiry of {0} seconds overflows the clock")]
    ExpiryOverflow(u64),
}

/// Reasons a presigned URL fails verification
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    /// URL could not be parsed
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    /// A required query parameter is missing
    #[error("Missing query parameter: {0}")]
    MissingParameter(&'static str),

    /// A query parameter has an unexpected shape
    #[error("Invalid query parameter: {0}")]
    InvalidParameter(&'static str),

    /// Credential does not belong to this verifier
    #[error("Credential scope does not match")]
    CredentialMismatch,

    /// A signed header was not supplied with the request
    #[error("Missing signed header: {0}")]
    MissingHeader(String),

    /// URL has expired
    #[error("Presigned URL has expired")]
    Expired,

    /// URL was signed too far in the future
    #[error("Presigned URL is not yet valid")]
    NotYetValid,

    /// Recomputed signature differs
    #[error("Signature does not match")]
    SignatureMismatch,
}
