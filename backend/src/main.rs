use std::sync::Arc;

use registry_backend::{server, types::Environment, upload_issuance::UploadIssuers};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.tracing_level().to_string()));

    // JSON for staging/production (Datadog), human-readable for development
    if environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let uploads = Arc::new(UploadIssuers::from_environment(&environment)?);

    server::start(environment, uploads).await
}
