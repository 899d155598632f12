use headers::{Authorization, HeaderMapExt, authorization::Bearer};
use reqwest::header::HeaderMap;
use sha2::{Digest, Sha256};

use crate::error::ApiError;

/// Short SHA-256 fingerprint of an access token, safe to put in logs.
/// The server stores the full hex digest; twelve characters are enough to
/// tell sessions apart in a trace.
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let out = hasher.finalize();
    let mut digest = hex::encode(out);
    digest.truncate(12);
    digest
}

/// `Authorization: Bearer <token>` headers for one request.
pub fn bearer_headers(token: &str) -> Result<HeaderMap, ApiError> {
    let authz = Authorization::bearer(token)
        .map_err(|_| ApiError::Session("stored access token is not a valid header value".into()))?;
    let mut headers = HeaderMap::new();
    headers.typed_insert::<Authorization<Bearer>>(authz);
    Ok(headers)
}
