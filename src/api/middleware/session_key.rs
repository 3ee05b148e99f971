//! Delegated-key extraction from the `x-session-key` header
//!
//! Presence of the header marks the request as delegated: the named key must
//! pass the validation gate before the operation runs. Absence means an
//! ordinary first-party request, which the gate never sees.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::api::state::AppState;
use crate::api::types::ApiError;

pub const SESSION_KEY_HEADER: &str = "x-session-key";

/// Extractor for the optional delegated session key
///
/// Never rejects on absence. A present but malformed header value is a client
/// error, not an ordinary request.
#[derive(Debug, Clone)]
pub struct DelegatedKey(pub Option<String>);

impl FromRequestParts<AppState> for DelegatedKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_key(&parts.headers).map(DelegatedKey)
    }
}

/// Pull the session key out of the headers, if present
pub fn extract_session_key(headers: &axum::http::HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(SESSION_KEY_HEADER) else {
        return Ok(None);
    };

    let key = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid x-session-key header encoding"))?
        .trim();

    if key.is_empty() {
        return Err(ApiError::bad_request("x-session-key header is empty"));
    }

    Ok(Some(key.to_string()))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, StatusCode};

    use super::*;

    #[test]
    fn test_absent_header_is_ordinary_request() {
        let headers = HeaderMap::new();
        assert_eq!(extract_session_key(&headers).unwrap(), None);
    }

    #[test]
    fn test_present_header_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_KEY_HEADER, "0xabc123".parse().unwrap());

        assert_eq!(
            extract_session_key(&headers).unwrap(),
            Some("0xabc123".to_string())
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_KEY_HEADER, "  0xabc123  ".parse().unwrap());

        assert_eq!(
            extract_session_key(&headers).unwrap(),
            Some("0xabc123".to_string())
        );
    }

    #[test]
    fn test_empty_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_KEY_HEADER, "   ".parse().unwrap());

        let err = extract_session_key(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
