//! Environment configuration for different deployment stages

use std::env;

use thiserror::Error;
use tracing::Level;
use upload_storage::{
    Credentials, Endpoint, ExpiryPolicy, StorageConfig, StorageConfigError, TIGRIS_ENDPOINT,
};

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const DEVELOPMENT_BUCKET: &str = "registry-uploads";
const DEVELOPMENT_REGION: &str = "us-east-1";
const DEVELOPMENT_CREDENTIAL: &str = "test";
const TIGRIS_REGION: &str = "auto";

/// Lifetime of an upload URL unless overridden in development
const PRESIGNED_URL_EXPIRY_SECS: u64 = 60;
/// Upload URLs never live longer than this
const PRESIGNED_URL_MAX_EXPIRY_SECS: u64 = 15 * 60;

/// Errors found while reading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `APP_ENV` holds an unknown stage
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// A required variable is not set
    #[error("{0} environment variable is not set")]
    MissingVar(&'static str),

    /// Storage settings are present but unusable
    #[error("Invalid storage configuration: {0}")]
    Storage(#[from] StorageConfigError),
}

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for presigned URL expiry in seconds
        presign_expiry_override: Option<u64>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvironment` if `APP_ENV` contains an invalid value
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => {
                let presign_expiry_override = var("PRESIGNED_URL_EXPIRY_SECS")
                    .and_then(|val| val.parse::<u64>().ok());

                Ok(Self::Development {
                    presign_expiry_override,
                })
            }
            _ => Err(ConfigError::InvalidEnvironment(env)),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Whether logs are emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Presigned URL expiry time in seconds
    #[must_use]
    pub fn presigned_url_expiry_secs(&self) -> u64 {
        match self {
            Self::Production | Self::Staging => PRESIGNED_URL_EXPIRY_SECS,
            Self::Development {
                presign_expiry_override,
            } => presign_expiry_override.unwrap_or(PRESIGNED_URL_EXPIRY_SECS),
        }
    }

    /// Expiry bounds for every signer
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Storage` if the development override is zero or
    /// above the ceiling
    pub fn expiry_policy(&self) -> Result<ExpiryPolicy, ConfigError> {
        Ok(ExpiryPolicy::new(
            self.presigned_url_expiry_secs(),
            PRESIGNED_URL_MAX_EXPIRY_SECS,
        )?)
    }

    /// Primary S3 storage
    ///
    /// Development falls back to `LocalStack` defaults; other stages require
    /// every `S3_*` setting except the endpoint and session token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or invalid
    pub fn primary_storage(&self) -> Result<StorageConfig, ConfigError> {
        match self {
            Self::Production | Self::Staging => {
                let credentials = Credentials::new(
                    required("S3_ACCESS_KEY_ID")?,
                    required("S3_SECRET_ACCESS_KEY")?,
                    required("S3_REGION")?,
                )?
                .with_session_token(var("S3_SESSION_TOKEN"));

                let endpoint = match var("S3_ENDPOINT_URL") {
                    Some(url) => Endpoint::custom(&url, false)?,
                    None => Endpoint::aws(credentials.region()),
                };

                Ok(StorageConfig::new(
                    credentials,
                    required("S3_BUCKET_NAME")?,
                    endpoint,
                )?)
            }
            Self::Development { .. } => {
                let credentials = Credentials::new(
                    var("S3_ACCESS_KEY_ID").unwrap_or_else(|| DEVELOPMENT_CREDENTIAL.to_string()),
                    var("S3_SECRET_ACCESS_KEY")
                        .unwrap_or_else(|| DEVELOPMENT_CREDENTIAL.to_string()),
                    var("S3_REGION").unwrap_or_else(|| DEVELOPMENT_REGION.to_string()),
                )?
                .with_session_token(var("S3_SESSION_TOKEN"));

                // Path-style addressing for compatibility with LocalStack
                let endpoint = Endpoint::custom(
                    &var("S3_ENDPOINT_URL").unwrap_or_else(|| LOCALSTACK_ENDPOINT.to_string()),
                    true,
                )?;

                Ok(StorageConfig::new(
                    credentials,
                    var("S3_BUCKET_NAME").unwrap_or_else(|| DEVELOPMENT_BUCKET.to_string()),
                    endpoint,
                )?)
            }
        }
    }

    /// Tigris storage, enabled by setting `TIGRIS_BUCKET_NAME`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the bucket is set but credentials are missing
    /// or any value is invalid
    pub fn tigris_storage(&self) -> Result<Option<StorageConfig>, ConfigError> {
        let Some(bucket) = var("TIGRIS_BUCKET_NAME") else {
            return Ok(None);
        };

        let credentials = Credentials::new(
            required("TIGRIS_ACCESS_KEY_ID")?,
            required("TIGRIS_SECRET_ACCESS_KEY")?,
            var("TIGRIS_REGION").unwrap_or_else(|| TIGRIS_REGION.to_string()),
        )?;
        let endpoint = Endpoint::custom(
            &var("TIGRIS_ENDPOINT_URL").unwrap_or_else(|| TIGRIS_ENDPOINT.to_string()),
            false,
        )?;

        Ok(Some(StorageConfig::new(credentials, bucket, endpoint)?))
    }

    /// Default log level when `RUST_LOG` is not set
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development { .. } => Level::DEBUG,
            })
    }
}

/// Reads a variable, treating blank values as unset
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    var(name).ok_or(ConfigError::MissingVar(name))
}
