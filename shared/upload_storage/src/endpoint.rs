//! Addressing rules for S3-compatible endpoints

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::StorageConfigError;

/// Characters SigV4 leaves unencoded: `A-Z a-z 0-9 - . _ ~`
pub(crate) const SIGV4_QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Same as the query set but keeps `/` so object keys stay path-like
const SIGV4_PATH: &AsciiSet = &SIGV4_QUERY.remove(b'/');

/// Tigris global endpoint
pub const TIGRIS_ENDPOINT: &str = "https://fly.storage.tigris.dev";

/// Where a bucket lives and how objects in it are addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    path_style: bool,
}

impl Endpoint {
    /// Regional AWS S3 endpoint with virtual-hosted addressing
    #[must_use]
    pub fn aws(region: &str) -> Self {
        Self {
            scheme: "https".to_string(),
            host: format!("s3.{region}.amazonaws.com"),
            path_style: false,
        }
    }

    /// Any S3-compatible endpoint, e.g. Tigris or `LocalStack`
    ///
    /// # Errors
    ///
    /// Returns `StorageConfigError::InvalidEndpoint` if `url` does not parse,
    /// is not http(s), or has no host
    pub fn custom(url: &str, path_style: bool) -> Result<Self, StorageConfigError> {
        let parsed =
            Url::parse(url).map_err(|e| StorageConfigError::InvalidEndpoint(format!("{url}: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StorageConfigError::InvalidEndpoint(format!(
                "{url}: unsupported scheme"
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| StorageConfigError::InvalidEndpoint(format!("{url}: missing host")))?;

        let host = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host,
            path_style,
        })
    }

    /// Whether the bucket goes in the path rather than the host name
    #[must_use]
    pub const fn is_path_style(&self) -> bool {
        self.path_style
    }

    /// Host header value for requests against `bucket`
    #[must_use]
    pub fn object_host(&self, bucket: &str) -> String {
        if self.path_style {
            self.host.clone()
        } else {
            format!("{bucket}.{}", self.host)
        }
    }

    /// URI-encoded request path for `key` in `bucket`
    #[must_use]
    pub fn object_path(&self, bucket: &str, key: &str) -> String {
        let key = utf8_percent_encode(key, SIGV4_PATH);
        if self.path_style {
            format!("/{}/{key}", utf8_percent_encode(bucket, SIGV4_QUERY))
        } else {
            format!("/{key}")
        }
    }

    /// Unsigned URL of `key` in `bucket`
    #[must_use]
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}://{}{}",
            self.scheme,
            self.object_host(bucket),
            self.object_path(bucket, key)
        )
    }
}

/// URI-encodes a query component the way SigV4 expects
pub(crate) fn encode_query_component(value: &str) -> String {
    utf8_percent_encode(value, SIGV4_QUERY).to_string()
}
