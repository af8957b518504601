use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{body::Body, http::Request, response::Response, Router};
use registry_backend::{
    server,
    types::Environment,
    upload_issuance::{UploadIssuer, UploadIssuers},
};
use tower::ServiceExt;
use upload_storage::{
    Credentials, Endpoint, ExpiryPolicy, OperationDescriptor, RequestSigner, SignedUrl,
    SigningError, SigningResult, UrlSigner, TIGRIS_ENDPOINT,
};

pub const PRIMARY_BUCKET: &str = "registry-uploads";
pub const TIGRIS_BUCKET: &str = "registry-media";
pub const EXPIRY_SECS: u64 = 60;

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

pub fn primary_credentials() -> Credentials {
    Credentials::new("AKIDPRIMARY", "primary-secret", "us-east-1").unwrap()
}

pub fn tigris_credentials() -> Credentials {
    Credentials::new("tid_TIGRIS", "tigris-secret", "auto").unwrap()
}

/// Signer that records how often it was asked to sign
pub struct CountingSigner {
    inner: RequestSigner,
    calls: AtomicUsize,
}

impl CountingSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: RequestSigner::new(credentials, ExpiryPolicy::new(EXPIRY_SECS, 900).unwrap()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UrlSigner for CountingSigner {
    fn sign(
        &self,
        operation: &OperationDescriptor,
        expires_in_secs: Option<u64>,
    ) -> SigningResult<SignedUrl> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sign(operation, expires_in_secs)
    }
}

/// Signer that always fails
pub struct FailingSigner;

impl UrlSigner for FailingSigner {
    fn sign(&self, _: &OperationDescriptor, _: Option<u64>) -> SigningResult<SignedUrl> {
        Err(SigningError::ExpiryOverflow(u64::MAX))
    }
}

/// Router wired the same way as production, with observable signers
pub struct TestSetup {
    pub router: Router,
    pub primary_signer: Arc<CountingSigner>,
    pub tigris_signer: Option<Arc<CountingSigner>>,
}

impl TestSetup {
    /// Primary AWS bucket only
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Primary AWS bucket plus a Tigris bucket for scoped namespaces
    pub fn with_tigris() -> Self {
        Self::build(true)
    }

    /// Every signing attempt fails
    pub fn failing() -> Self {
        setup_test_env();

        let issuers = UploadIssuers::new(
            UploadIssuer::new(
                Endpoint::aws("us-east-1"),
                PRIMARY_BUCKET,
                Arc::new(FailingSigner),
                EXPIRY_SECS,
            ),
            None,
        );

        Self {
            router: router(issuers),
            primary_signer: Arc::new(CountingSigner::new(primary_credentials())),
            tigris_signer: None,
        }
    }

    fn build(tigris: bool) -> Self {
        setup_test_env();

        let primary_signer = Arc::new(CountingSigner::new(primary_credentials()));
        let primary = UploadIssuer::new(
            Endpoint::aws("us-east-1"),
            PRIMARY_BUCKET,
            primary_signer.clone(),
            EXPIRY_SECS,
        );

        let tigris_signer = tigris.then(|| Arc::new(CountingSigner::new(tigris_credentials())));
        let tigris = tigris_signer.as_ref().map(|signer| {
            UploadIssuer::new(
                Endpoint::custom(TIGRIS_ENDPOINT, false).unwrap(),
                TIGRIS_BUCKET,
                signer.clone(),
                EXPIRY_SECS,
            )
        });

        Self {
            router: router(UploadIssuers::new(primary, tigris)),
            primary_signer,
            tigris_signer,
        }
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }
}

fn router(issuers: UploadIssuers) -> Router {
    server::router(
        Environment::Development {
            presign_expiry_override: None,
        },
        Arc::new(issuers),
    )
}
