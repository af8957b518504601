//! Long-lived storage credentials and target configuration

use std::fmt;

use crate::endpoint::Endpoint;
use crate::error::StorageConfigError;

const DEFAULT_SERVICE: &str = "s3";

/// Access key pair plus the scope it signs for
///
/// `Debug` never prints the secret key or session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    region: String,
    service: String,
    session_token: Option<String>,
}

impl Credentials {
    /// Creates credentials for the `s3` service
    ///
    /// # Errors
    ///
    /// Returns `StorageConfigError::MissingField` if any value is blank
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, StorageConfigError> {
        Ok(Self {
            access_key_id: non_blank(access_key_id.into(), "access key id")?,
            secret_access_key: non_blank(secret_access_key.into(), "secret access key")?,
            region: non_blank(region.into(), "region")?,
            service: DEFAULT_SERVICE.to_string(),
            session_token: None,
        })
    }

    /// Attaches a temporary session token; blank tokens are ignored
    #[must_use]
    pub fn with_session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Access key id
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Region in the credential scope
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service in the credential scope
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Session token for temporary credentials
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub(crate) fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("service", &self.service)
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Everything needed to sign requests against one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    credentials: Credentials,
    bucket: String,
    endpoint: Endpoint,
}

impl StorageConfig {
    /// Creates a storage configuration
    ///
    /// # Errors
    ///
    /// Returns `StorageConfigError::InvalidBucket` if the bucket name cannot be
    /// used as a DNS label
    pub fn new(
        credentials: Credentials,
        bucket: impl Into<String>,
        endpoint: Endpoint,
    ) -> Result<Self, StorageConfigError> {
        let bucket = non_blank(bucket.into(), "bucket name")?;
        validate_bucket_name(&bucket)?;

        Ok(Self {
            credentials,
            bucket,
            endpoint,
        })
    }

    /// Signing credentials
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Bucket name
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Endpoint addressing
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

fn non_blank(value: String, field: &'static str) -> Result<String, StorageConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StorageConfigError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn validate_bucket_name(bucket: &str) -> Result<(), StorageConfigError> {
    let bytes = bucket.as_bytes();
    let valid_chars = bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'.' || *b == b'-');
    let valid_edges = bytes.first().is_some_and(u8::is_ascii_alphanumeric)
        && bytes.last().is_some_and(u8::is_ascii_alphanumeric);

    if (3..=63).contains(&bytes.len()) && valid_chars && valid_edges && !bucket.contains("..") {
        Ok(())
    } else {
        Err(StorageConfigError::InvalidBucket(bucket.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_rejected() {
        assert_eq!(
            Credentials::new("", "secret", "us-east-1"),
            Err(StorageConfigError::MissingField("access key id"))
        );
        assert_eq!(
            Credentials::new("AKID", "  ", "us-east-1"),
            Err(StorageConfigError::MissingField("secret access key"))
        );
        assert_eq!(
            Credentials::new("AKID", "secret", ""),
            Err(StorageConfigError::MissingField("region"))
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = Credentials::new("AKIDEXAMPLE", "super-secret-key", "us-east-1")
            .unwrap()
            .with_session_token(Some("session-token-value".to_string()));

        let debug = format!("{credentials:?}");
        assert!(debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("super-secret-key"));
        assert!(!debug.contains("session-token-value"));

        let config = StorageConfig::new(credentials, "gifts", Endpoint::aws("us-east-1")).unwrap();
        assert!(!format!("{config:?}").contains("super-secret-key"));
    }

    #[test]
    fn test_blank_session_token_is_ignored() {
        let credentials = Credentials::new("AKID", "secret", "auto")
            .unwrap()
            .with_session_token(Some(String::new()));
        assert_eq!(credentials.session_token(), None);
    }

    #[test]
    fn test_bucket_names() {
        let credentials = Credentials::new("AKID", "secret", "us-east-1").unwrap();
        let endpoint = Endpoint::aws("us-east-1");

        for ok in ["gifts", "registry-uploads", "my.bucket.01"] {
            assert!(StorageConfig::new(credentials.clone(), ok, endpoint.clone()).is_ok());
        }
        for bad in ["ab", "Gifts", "-gifts", "gifts-", "a..b", "gifts/x", "gifts_x"] {
            assert_eq!(
                StorageConfig::new(credentials.clone(), bad, endpoint.clone()),
                Err(StorageConfigError::InvalidBucket(bad.to_string()))
            );
        }
        assert_eq!(
            StorageConfig::new(credentials, "", endpoint),
            Err(StorageConfigError::MissingField("bucket name"))
        );
    }
}
