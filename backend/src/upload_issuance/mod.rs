//! Presigned upload URL issuance
mod error;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use upload_storage::{
    Endpoint, ExpiryPolicy, KeyError, Namespace, ObjectKey, ObjectKeyDeriver, ObjectLocation,
    OperationDescriptor, PutObject, RequestSigner, StorageConfig, UrlSigner,
};

pub use error::{IssuanceError, IssuanceResult};

use crate::types::{ConfigError, Environment};

/// Returned when either upload parameter is missing
pub const MISSING_FILE_PARAMS: &str = "fileName and fileType are required";
/// Returned when `fileType` is not a MIME type
pub const INVALID_FILE_TYPE: &str = "fileType must be a valid MIME type";
/// Returned when an owning entity id is not a safe key segment
pub const INVALID_ENTITY_ID: &str = "Invalid entity id";

/// Every upload is stored below this subpath of its owner
const IMAGES_SUBPATH: &str = "images";

/// Result of a successful issuance
#[derive(Debug, Clone)]
pub struct IssuedUpload {
    /// Server-derived object key
    pub key: ObjectKey,
    /// URL the client PUTs the file to
    pub presigned_url: String,
    /// Stable URL of the object after upload
    pub file_url: String,
    /// When `presigned_url` stops working
    pub expires_at: DateTime<Utc>,
}

/// Issues presigned URLs for one bucket
pub struct UploadIssuer {
    endpoint: Endpoint,
    bucket: String,
    keys: ObjectKeyDeriver,
    signer: Arc<dyn UrlSigner>,
    expiry_secs: u64,
}

impl UploadIssuer {
    /// Creates an issuer with the default key deriver
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Addressing rules for the bucket
    /// * `bucket` - Bucket name
    /// * `signer` - Signer holding the bucket's credentials
    /// * `expiry_secs` - Lifetime requested for every URL
    #[must_use]
    pub fn new(
        endpoint: Endpoint,
        bucket: impl Into<String>,
        signer: Arc<dyn UrlSigner>,
        expiry_secs: u64,
    ) -> Self {
        Self {
            endpoint,
            bucket: bucket.into(),
            keys: ObjectKeyDeriver::default(),
            signer,
            expiry_secs,
        }
    }

    /// Creates an issuer that signs with the credentials in `config`
    #[must_use]
    pub fn from_config(config: &StorageConfig, expiry: ExpiryPolicy) -> Self {
        let signer = RequestSigner::new(config.credentials().clone(), expiry);
        Self::new(
            config.endpoint().clone(),
            config.bucket(),
            Arc::new(signer),
            expiry.default_secs(),
        )
    }

    /// Replaces the key deriver
    #[must_use]
    pub fn with_key_deriver(mut self, keys: ObjectKeyDeriver) -> Self {
        self.keys = keys;
        self
    }

    /// Bucket this issuer signs for
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Issues a URL the client may PUT `file_name` to
    ///
    /// Input is validated before any key is derived or anything is signed.
    ///
    /// # Arguments
    ///
    /// * `namespace` - Key prefix for the owning record type
    /// * `entity_ids` - Owning record ids, outermost first
    /// * `file_name` - Client file name, used only for its extension
    /// * `file_type` - MIME type the client will send as `Content-Type`
    ///
    /// # Errors
    ///
    /// - `IssuanceError::InvalidRequest` - missing parameters, bad MIME type, or bad entity id
    /// - `IssuanceError::Descriptor` - the PUT operation could not be built
    /// - `IssuanceError::Signing` - signature computation failed
    pub fn issue_upload_url(
        &self,
        namespace: Namespace,
        entity_ids: &[&str],
        file_name: &str,
        file_type: &str,
    ) -> IssuanceResult<IssuedUpload> {
        let file_name = file_name.trim();
        let file_type = file_type.trim();

        if file_name.is_empty() || file_type.is_empty() {
            return Err(IssuanceError::InvalidRequest(MISSING_FILE_PARAMS));
        }
        // Sent back verbatim as a signed header, so it must be visible ASCII
        let header_safe = file_type.bytes().all(|b| (0x20..=0x7e).contains(&b));
        if !header_safe || file_type.parse::<mime::Mime>().is_err() {
            return Err(IssuanceError::InvalidRequest(INVALID_FILE_TYPE));
        }

        let key = self
            .keys
            .derive(namespace, entity_ids, IMAGES_SUBPATH, file_name)
            .map_err(|e| match e {
                KeyError::InvalidEntityId(_) => IssuanceError::InvalidRequest(INVALID_ENTITY_ID),
                other => IssuanceError::Key(other),
            })?;

        debug!("Derived object key: {key}");

        let location = ObjectLocation::new(&self.endpoint, &self.bucket, key.as_str())?;
        let put = PutObject::new(location, file_type)?;
        let file_url = put.final_url();

        let signed = self
            .signer
            .sign(&OperationDescriptor::from(put), Some(self.expiry_secs))?;

        info!(
            bucket = %self.bucket,
            key = %key,
            expires_at = %signed.expires_at,
            "Issued upload URL"
        );

        Ok(IssuedUpload {
            key,
            presigned_url: signed.url,
            file_url,
            expires_at: signed.expires_at,
        })
    }
}

/// Issuers for every configured storage target
///
/// The primary bucket serves generic uploads. Record-scoped namespaces use the
/// Tigris bucket when one is configured and fall back to the primary bucket.
pub struct UploadIssuers {
    primary: UploadIssuer,
    tigris: Option<UploadIssuer>,
}

impl UploadIssuers {
    /// Creates the registry
    #[must_use]
    pub const fn new(primary: UploadIssuer, tigris: Option<UploadIssuer>) -> Self {
        Self { primary, tigris }
    }

    /// Builds issuers from environment configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if storage configuration is missing or invalid
    pub fn from_environment(environment: &Environment) -> Result<Self, ConfigError> {
        let expiry = environment.expiry_policy()?;

        let primary = environment.primary_storage()?;
        info!(
            "Initialized upload issuer for bucket: {} ({:?})",
            primary.bucket(),
            primary.credentials()
        );

        let tigris = environment.tigris_storage()?;
        if let Some(tigris) = &tigris {
            info!("Initialized Tigris upload issuer for bucket: {}", tigris.bucket());
        }

        Ok(Self::new(
            UploadIssuer::from_config(&primary, expiry),
            tigris.map(|config| UploadIssuer::from_config(&config, expiry)),
        ))
    }

    /// Issuer responsible for `namespace`
    #[must_use]
    pub fn for_namespace(&self, namespace: Namespace) -> &UploadIssuer {
        match namespace {
            Namespace::Uploads => &self.primary,
            Namespace::ListItems | Namespace::Profiles | Namespace::Notes => {
                self.tigris.as_ref().unwrap_or(&self.primary)
            }
        }
    }
}
