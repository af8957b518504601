use std::{sync::Arc, time::Duration};

use aide::openapi::{Info, OpenApi};
use axum::{http::StatusCode, Extension, Router};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::routes;
use crate::{types::Environment, upload_issuance::UploadIssuers};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_PORT: u16 = 8001;

/// Builds the application router with its documentation and dependencies
#[must_use]
pub fn router(environment: Environment, uploads: Arc<UploadIssuers>) -> Router {
    let mut openapi = OpenApi {
        info: Info {
            title: "Gift Registry Backend".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(uploads))
        .layer(timeout_layer())
}

fn timeout_layer() -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT)
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if `PORT` is invalid or the server fails to bind
pub async fn start(environment: Environment, uploads: Arc<UploadIssuers>) -> anyhow::Result<()> {
    let router = router(environment, uploads)
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default());

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(DEFAULT_PORT), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Gift Registry Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}
