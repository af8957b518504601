mod docs;
mod health;
/// Upload URL handlers
pub mod resources;

use aide::axum::{routing::get, ApiRouter};

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/resources/images", get(resources::create_upload_url))
        .api_route(
            "/resources/{namespace}/{entityId}/images",
            get(resources::create_entity_upload_url),
        )
}
