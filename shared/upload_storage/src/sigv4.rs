//! SigV4 canonical request construction (query-string variant)

use std::collections::BTreeMap;

use hmac::{digest::InvalidLength, Hmac, Mac};
use http::Method;
use sha2::{Digest, Sha256};

use crate::endpoint::encode_query_component;

pub(crate) type HmacSha256 = Hmac<Sha256>;

pub(crate) const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub(crate) const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
pub(crate) const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
pub(crate) const DATE_STAMP_FORMAT: &str = "%Y%m%d";
const SCOPE_TERMINATOR: &str = "aws4_request";

pub(crate) const X_AMZ_ALGORITHM: &str = "X-Amz-Algorithm";
pub(crate) const X_AMZ_CREDENTIAL: &str = "X-Amz-Credential";
pub(crate) const X_AMZ_DATE: &str = "X-Amz-Date";
pub(crate) const X_AMZ_EXPIRES: &str = "X-Amz-Expires";
pub(crate) const X_AMZ_SIGNED_HEADERS: &str = "X-Amz-SignedHeaders";
pub(crate) const X_AMZ_SECURITY_TOKEN: &str = "X-Amz-Security-Token";
pub(crate) const X_AMZ_SIGNATURE: &str = "X-Amz-Signature";

/// Longest lifetime SigV4 allows for a presigned URL (7 days)
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

pub(crate) fn credential_scope(date_stamp: &str, region: &str, service: &str) -> String {
    format!("{date_stamp}/{region}/{service}/{SCOPE_TERMINATOR}")
}

pub(crate) fn is_scope_terminator(value: &str) -> bool {
    value == SCOPE_TERMINATOR
}

/// Sorted, encoded `name=value` pairs joined with `&`
pub(crate) fn canonical_query(params: &BTreeMap<String, String>) -> String {
    let mut pairs: Vec<String> = params
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                encode_query_component(name),
                encode_query_component(value)
            )
        })
        .collect();
    pairs.sort_unstable();
    pairs.join("&")
}

/// Returns the canonical header block and the signed header list
///
/// Header names must already be lowercase; `BTreeMap` keeps them sorted.
pub(crate) fn canonical_headers(headers: &BTreeMap<String, String>) -> (String, String) {
    let block = headers
        .iter()
        .map(|(name, value)| format!("{name}:{}\n", normalize_header_value(value)))
        .collect::<String>();
    let signed = headers.keys().map(String::as_str).collect::<Vec<_>>().join(";");
    (block, signed)
}

fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn canonical_request(
    method: &Method,
    path: &str,
    query: &str,
    header_block: &str,
    signed_headers: &str,
) -> String {
    format!("{method}\n{path}\n{query}\n{header_block}\n{signed_headers}\n{UNSIGNED_PAYLOAD}")
}

pub(crate) fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> String {
    let hashed = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    format!("{ALGORITHM}\n{amz_date}\n{scope}\n{hashed}")
}

pub(crate) fn hmac(key: &[u8], data: &[u8]) -> Result<HmacSha256, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(data);
    Ok(mac)
}

pub(crate) fn signing_key(
    secret: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, InvalidLength> {
    let k_date = hmac(format!("AWS4{secret}").as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac(&k_date.finalize().into_bytes(), region.as_bytes())?;
    let k_service = hmac(&k_region.finalize().into_bytes(), service.as_bytes())?;
    let k_signing = hmac(&k_service.finalize().into_bytes(), SCOPE_TERMINATOR.as_bytes())?;
    Ok(k_signing.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_known_answer() {
        let key = signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        )
        .unwrap();
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_canonical_headers_sorted_and_trimmed() {
        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), "gifts.example.com".to_string());
        headers.insert("content-type".to_string(), "  image/png;   charset=x ".to_string());

        let (block, signed) = canonical_headers(&headers);
        assert_eq!(block, "content-type:image/png; charset=x\nhost:gifts.example.com\n");
        assert_eq!(signed, "content-type;host");
    }

    #[test]
    fn test_canonical_query_is_sorted_and_encoded() {
        let mut params = BTreeMap::new();
        params.insert("X-Amz-Expires".to_string(), "60".to_string());
        params.insert("X-Amz-Credential".to_string(), "AK/2024/r/s3/aws4_request".to_string());
        params.insert("X-Amz-Algorithm".to_string(), ALGORITHM.to_string());

        assert_eq!(
            canonical_query(&params),
            "X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Credential=AK%2F2024%2Fr%2Fs3%2Faws4_request&X-Amz-Expires=60"
        );
    }
}
