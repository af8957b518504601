mod common;

use axum::http::StatusCode;
use common::*;

#[tokio::test]
async fn test_health_check() {
    let setup = TestSetup::new();

    let response = setup.send_get_request("/health").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(field(&body, "status"), "ok");
    assert_eq!(field(&body, "semver"), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_document_lists_upload_routes() {
    let setup = TestSetup::new();

    let response = setup.send_get_request("/openapi.json").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["info"]["title"], "Gift Registry Backend");
    assert!(body["paths"]["/resources/images"]["get"].is_object());
    assert!(body["paths"]["/resources/{namespace}/{entityId}/images"]["get"].is_object());
}
