use axum::response::Response;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use url::Url;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Reads a string field from a JSON body
pub fn field<'a>(body: &'a serde_json::Value, name: &str) -> &'a str {
    body[name]
        .as_str()
        .unwrap_or_else(|| panic!("missing string field {name} in {body}"))
}

/// Parses the `expiresAt` field
pub fn expires_at(body: &serde_json::Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(field(body, "expiresAt"))
        .unwrap()
        .with_timezone(&Utc)
}

/// Value of a query parameter in `url`
pub fn query_param(url: &str, name: &str) -> Option<String> {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
