//! Caller identity from the `x-amzn-oidc-data` header.
//!
//! The load balancer authenticates the user and forwards the OIDC claims
//! as a JWT in this header. The balancer is the trust boundary, so the
//! signature is not re-verified here; the claims segment is decoded as-is.

use super::error::ApiError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;

pub const OIDC_DATA_HEADER: &str = "x-amzn-oidc-data";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserClaims {
    pub email: String,
}

/// Decode the claims segment of the forwarded JWT.
pub fn claims_from_header(value: &str) -> Result<UserClaims, String> {
    let payload = value
        .split('.')
        .nth(1)
        .ok_or_else(|| String::from("header is not a JWT"))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD.decode(payload))
        .map_err(|e| format!("claims segment is not base64: {}", e))?;

    serde_json::from_slice(&bytes).map_err(|e| format!("claims are not valid JSON: {}", e))
}

#[async_trait]
impl<S> FromRequestParts<S> for UserClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(OIDC_DATA_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized(format!("missing {} header", OIDC_DATA_HEADER))
            })?;

        claims_from_header(value).map_err(ApiError::Unauthorized)
    }
}

/// Forge a header value for tests.
#[cfg(test)]
pub(crate) fn token_for(email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"ES256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"email":"{}"}}"#, email));
    format!("{}.{}.sig", header, claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_email_from_forwarded_jwt() {
        let claims = claims_from_header(&token_for("ada@example.com")).unwrap();
        assert_eq!(claims.email, "ada@example.com");
    }

    #[test]
    fn accepts_standard_base64_padding() {
        // Some proxies re-encode with padded standard base64
        let claims_segment = STANDARD.encode(br#"{"email":"ada@example.com"}"#);
        let token = format!("eyJhbGciOiJFUzI1NiJ9.{}.sig", claims_segment);
        let claims = claims_from_header(&token).unwrap();
        assert_eq!(claims.email, "ada@example.com");
    }

    #[test]
    fn rejects_garbage() {
        assert!(claims_from_header("not-a-jwt").is_err());
        assert!(claims_from_header("a.!!!.c").is_err());
        let no_email = format!(
            "h.{}.s",
            URL_SAFE_NO_PAD.encode(br#"{"sub":"123"}"#)
        );
        assert!(claims_from_header(&no_email).is_err());
    }
}
