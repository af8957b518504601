//! Server-side check of presigned URLs
//!
//! Recomputes the SigV4 signature the way an S3-compatible provider does when
//! a presigned URL is used. Useful for local mock storage and for tests that
//! have no real provider to talk to.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use hmac::Mac;
use http::Method;
use url::Url;

use crate::credentials::Credentials;
use crate::error::VerifyError;
use crate::sigv4::{
    self, ALGORITHM, AMZ_DATE_FORMAT, MAX_PRESIGN_EXPIRY_SECS, X_AMZ_ALGORITHM, X_AMZ_CREDENTIAL,
    X_AMZ_DATE, X_AMZ_EXPIRES, X_AMZ_SIGNATURE, X_AMZ_SIGNED_HEADERS,
};

/// How far in the future `X-Amz-Date` may be before a URL is rejected
pub const CLOCK_SKEW_TOLERANCE_SECS: i64 = 15 * 60;

/// Validates presigned URLs issued for one set of credentials
pub struct PresignedUrlVerifier {
    credentials: Credentials,
}

impl PresignedUrlVerifier {
    /// Creates a verifier that accepts URLs signed with `credentials`
    #[must_use]
    pub const fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Checks that `url` authorises a `method` request carrying `headers` at `now`
    ///
    /// `headers` are the request headers other than `Host`, which is taken
    /// from the URL. Names are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns the first `VerifyError` encountered
    pub fn verify(
        &self,
        method: &Method,
        url: &str,
        headers: &[(&str, &str)],
        now: DateTime<Utc>,
    ) -> Result<(), VerifyError> {
        let url = Url::parse(url).map_err(|e| VerifyError::MalformedUrl(e.to_string()))?;

        let mut params: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        let signature = params
            .remove(X_AMZ_SIGNATURE)
            .ok_or(VerifyError::MissingParameter(X_AMZ_SIGNATURE))?;
        let signature =
            hex::decode(signature).map_err(|_| VerifyError::InvalidParameter(X_AMZ_SIGNATURE))?;

        if required(&params, X_AMZ_ALGORITHM)? != ALGORITHM {
            return Err(VerifyError::InvalidParameter(X_AMZ_ALGORITHM));
        }

        let amz_date = required(&params, X_AMZ_DATE)?;
        let signed_at = NaiveDateTime::parse_from_str(amz_date, AMZ_DATE_FORMAT)
            .map_err(|_| VerifyError::InvalidParameter(X_AMZ_DATE))?
            .and_utc();
        let date_stamp = &amz_date[..8];

        let scope = self.check_credential(required(&params, X_AMZ_CREDENTIAL)?, date_stamp)?;

        let expires_in = required(&params, X_AMZ_EXPIRES)?
            .parse::<u64>()
            .ok()
            .filter(|secs| (1..=MAX_PRESIGN_EXPIRY_SECS).contains(secs))
            .and_then(|secs| i64::try_from(secs).ok())
            .ok_or(VerifyError::InvalidParameter(X_AMZ_EXPIRES))?;

        if signed_at - now > Duration::seconds(CLOCK_SKEW_TOLERANCE_SECS) {
            return Err(VerifyError::NotYetValid);
        }
        if now > signed_at + Duration::seconds(expires_in) {
            return Err(VerifyError::Expired);
        }

        let signed_headers = required(&params, X_AMZ_SIGNED_HEADERS)?;
        if !signed_headers.split(';').any(|name| name == "host") {
            return Err(VerifyError::InvalidParameter(X_AMZ_SIGNED_HEADERS));
        }
        let header_values = collect_signed_headers(&url, signed_headers, headers)?;
        let (header_block, signed_list) = sigv4::canonical_headers(&header_values);
        if signed_list != signed_headers {
            return Err(VerifyError::InvalidParameter(X_AMZ_SIGNED_HEADERS));
        }

        let canonical_request = sigv4::canonical_request(
            method,
            url.path(),
            &sigv4::canonical_query(&params),
            &header_block,
            signed_headers,
        );
        let string_to_sign = sigv4::string_to_sign(amz_date, &scope, &canonical_request);

        let key = sigv4::signing_key(
            self.credentials.secret_access_key(),
            date_stamp,
            self.credentials.region(),
            self.credentials.service(),
        )
        .map_err(|_| VerifyError::SignatureMismatch)?;

        sigv4::hmac(&key, string_to_sign.as_bytes())
            .map_err(|_| VerifyError::SignatureMismatch)?
            .verify_slice(&signature)
            .map_err(|_| VerifyError::SignatureMismatch)
    }

    fn check_credential(&self, credential: &str, date_stamp: &str) -> Result<String, VerifyError> {
        let parts: Vec<&str> = credential.split('/').collect();
        let [access_key, date, region, service, terminator] = parts.as_slice() else {
            return Err(VerifyError::InvalidParameter(X_AMZ_CREDENTIAL));
        };

        if *access_key != self.credentials.access_key_id()
            || *date != date_stamp
            || *region != self.credentials.region()
            || *service != self.credentials.service()
            || !sigv4::is_scope_terminator(terminator)
        {
            return Err(VerifyError::CredentialMismatch);
        }

        Ok(sigv4::credential_scope(date, region, service))
    }
}

fn required<'a>(
    params: &'a BTreeMap<String, String>,
    name: &'static str,
) -> Result<&'a str, VerifyError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or(VerifyError::MissingParameter(name))
}

fn collect_signed_headers(
    url: &Url,
    signed_headers: &str,
    headers: &[(&str, &str)],
) -> Result<BTreeMap<String, String>, VerifyError> {
    let mut values = BTreeMap::new();

    for name in signed_headers.split(';') {
        let value = if name == "host" {
            let host = url
                .host_str()
                .ok_or_else(|| VerifyError::MalformedUrl("missing host".to_string()))?;
            match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            }
        } else {
            headers
                .iter()
                .find(|(header, _)| header.eq_ignore_ascii_case(name))
                .map(|(_, value)| (*value).to_string())
                .ok_or_else(|| VerifyError::MissingHeader(name.to_string()))?
        };
        values.insert(name.to_string(), value);
    }

    Ok(values)
}
