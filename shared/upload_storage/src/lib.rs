//! Signed upload URLs for S3-compatible object stores
//!
//! This crate holds everything the registry needs to hand a browser a
//! short-lived URL it can upload to directly: server-side object key
//! derivation, storage operation descriptors, SigV4 query-string signing and
//! a verifier that checks presigned URLs the way the storage provider does.
//! Signing is local CPU work; nothing here performs network I/O.

pub mod clock;
pub mod credentials;
pub mod descriptor;
pub mod endpoint;
pub mod error;
pub mod key;
pub mod signer;
mod sigv4;
pub mod verifier;

pub use clock::{Clock, FixedClock, SystemClock};
pub use credentials::{Credentials, StorageConfig};
pub use descriptor::{ObjectLocation, OperationDescriptor, PutObject};
pub use endpoint::{Endpoint, TIGRIS_ENDPOINT};
pub use error::{
    DescriptorError, KeyError, SigningError, SigningResult, StorageConfigError, VerifyError,
};
pub use key::{IdSource, Namespace, ObjectKey, ObjectKeyDeriver, RandomIdSource};
pub use signer::{ExpiryPolicy, RequestSigner, SignedUrl, UrlSigner, DEFAULT_EXPIRY_SECS};
pub use sigv4::MAX_PRESIGN_EXPIRY_SECS;
pub use verifier::PresignedUrlVerifier;
