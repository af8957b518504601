//! Storage operation descriptors
//!
//! An `OperationDescriptor` is an immutable description of a single request
//! against the object store. It carries everything the signer needs and does
//! no I/O of its own.

use std::collections::BTreeMap;

use http::Method;

use crate::endpoint::Endpoint;
use crate::error::DescriptorError;

/// A single object in a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    endpoint: Endpoint,
    bucket: String,
    key: String,
}

impl ObjectLocation {
    /// Creates a location, rejecting empty or path-escaping keys
    ///
    /// # Errors
    ///
    /// Returns `DescriptorError::EmptyBucket`, `DescriptorError::EmptyKey` or
    /// `DescriptorError::InvalidKey`
    pub fn new(endpoint: &Endpoint, bucket: &str, key: &str) -> Result<Self, DescriptorError> {
        if bucket.is_empty() {
            return Err(DescriptorError::EmptyBucket);
        }
        if key.is_empty() {
            return Err(DescriptorError::EmptyKey);
        }
        if key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(DescriptorError::InvalidKey(key.to_string()));
        }

        Ok(Self {
            endpoint: endpoint.clone(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// Bucket name
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Host the request is sent to
    #[must_use]
    pub fn host(&self) -> String {
        self.endpoint.object_host(&self.bucket)
    }

    /// Encoded request path
    #[must_use]
    pub fn path(&self) -> String {
        self.endpoint.object_path(&self.bucket, &self.key)
    }

    /// Unsigned URL of the object
    #[must_use]
    pub fn url(&self) -> String {
        self.endpoint.object_url(&self.bucket, &self.key)
    }
}

/// Upload of a new object with a fixed content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    location: ObjectLocation,
    content_type: String,
}

impl PutObject {
    /// Creates a PUT description
    ///
    /// # Errors
    ///
    /// Returns `DescriptorError::EmptyContentType` for a blank content type and
    /// `DescriptorError::InvalidHeaderValue` if it has non-printable characters
    pub fn new(location: ObjectLocation, content_type: &str) -> Result<Self, DescriptorError> {
        let content_type = content_type.trim();
        if content_type.is_empty() {
            return Err(DescriptorError::EmptyContentType);
        }
        if !content_type.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
            return Err(DescriptorError::InvalidHeaderValue("content-type"));
        }

        Ok(Self {
            location,
            content_type: content_type.to_string(),
        })
    }

    /// Target location
    #[must_use]
    pub const fn location(&self) -> &ObjectLocation {
        &self.location
    }

    /// Content type the uploader must send
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Stable, unsigned URL of the object once it has been uploaded
    #[must_use]
    pub fn final_url(&self) -> String {
        self.location.url()
    }
}

/// One storage operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationDescriptor {
    /// Download an object
    Get(ObjectLocation),
    /// Upload an object
    Put(PutObject),
    /// Remove an object
    Delete(ObjectLocation),
}

impl OperationDescriptor {
    /// GET `key` from `bucket`
    ///
    /// # Errors
    ///
    /// See [`ObjectLocation::new`]
    pub fn get(endpoint: &Endpoint, bucket: &str, key: &str) -> Result<Self, DescriptorError> {
        ObjectLocation::new(endpoint, bucket, key).map(Self::Get)
    }

    /// DELETE `key` from `bucket`
    ///
    /// # Errors
    ///
    /// See [`ObjectLocation::new`]
    pub fn delete(endpoint: &Endpoint, bucket: &str, key: &str) -> Result<Self, DescriptorError> {
        ObjectLocation::new(endpoint, bucket, key).map(Self::Delete)
    }

    /// PUT `key` into `bucket` with `content_type`
    ///
    /// # Errors
    ///
    /// See [`ObjectLocation::new`] and [`PutObject::new`]
    pub fn put(
        endpoint: &Endpoint,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> Result<Self, DescriptorError> {
        let location = ObjectLocation::new(endpoint, bucket, key)?;
        PutObject::new(location, content_type).map(Self::Put)
    }

    /// HTTP method
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::Get(_) => Method::GET,
            Self::Put(_) => Method::PUT,
            Self::Delete(_) => Method::DELETE,
        }
    }

    /// Target location
    #[must_use]
    pub const fn location(&self) -> &ObjectLocation {
        match self {
            Self::Get(location) | Self::Delete(location) => location,
            Self::Put(put) => put.location(),
        }
    }

    /// Headers bound into the signature, keyed by lowercase name
    #[must_use]
    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), self.location().host());
        if let Self::Put(put) = self {
            headers.insert("content-type".to_string(), put.content_type().to_string());
        }
        headers
    }
}

impl From<PutObject> for OperationDescriptor {
    fn from(put: PutObject) -> Self {
        Self::Put(put)
    }
}
